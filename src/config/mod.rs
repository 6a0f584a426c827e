//! Site configuration management for `blueprint.toml`.
//!
//! The file is optional: a project made only of `configs/`, `models/`,
//! `blueprints/` and `assets/` builds with the defaults.
//!
//! | Section            | Purpose                                  |
//! |--------------------|------------------------------------------|
//! | `[base]`           | Public site URL (sitemap)                |
//! | `[build]`          | Source directories, output, minify       |
//! | `[build.sitemap]`  | `sitemap.xml` generation                 |
//! | `[build.images]`   | External image optimizers                |
//!
//! # Example
//!
//! ```toml
//! [base]
//! url = "https://example.com"
//!
//! [build]
//! output = "public"
//! root_page = "home"
//!
//! [build.sitemap]
//! enable = true
//! ```

mod build;
pub mod defaults;
mod error;

pub use build::{BuildConfig, ImagesConfig};
pub use error::ConfigError;

use crate::cli::Cli;
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config filename, looked up under the project root.
pub const CONFIG_FILE: &str = "blueprint.toml";

/// `[base]` section - site identity.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BaseConfig {
    /// Public URL, required for sitemap generation.
    #[serde(default = "defaults::base::url")]
    #[educe(Default = defaults::base::url())]
    pub url: Option<String>,
}

/// Root configuration structure representing blueprint.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading, may not exist)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub base: BaseConfig,

    #[serde(default)]
    pub build: BuildConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load configuration for a CLI invocation.
    ///
    /// A missing default `blueprint.toml` means "use defaults"; a config path
    /// given explicitly with `-C` must exist.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let relative = cli.config.clone().unwrap_or_else(|| CONFIG_FILE.into());
        let config_path = root.join(&relative);

        let mut config = match (config_path.exists(), cli.config.is_some()) {
            (true, _) => Self::from_path(&config_path)?,
            (false, true) => bail!(ConfigError::NotFound(config_path)),
            (false, false) => Self::default(),
        };
        config.config_path = relative;
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Raw image directory (`<static>/<images.dir>`).
    pub fn image_dir(&self) -> PathBuf {
        self.build.static_dir.join(&self.build.images.dir)
    }

    /// Sibling directory a build is staged in before it replaces the output.
    pub fn staging_dir(&self) -> PathBuf {
        let name = self
            .build
            .output
            .file_name()
            .map_or_else(|| "output".into(), |n| n.to_string_lossy().into_owned());
        self.build.output.with_file_name(format!(".{name}.staging"))
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        Self::update_option(&mut self.build.output, cli.output.as_ref());

        let args = cli.build_args();
        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        Self::update_option(&mut self.build.sitemap.enable, args.sitemap.as_ref());
        Self::update_option(&mut self.build.images.enable, args.images.as_ref());

        self.update_path_with_root(&root);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve every directory against the root and make it absolute.
    pub fn update_path_with_root(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.build.root = Some(root.clone());

        self.config_path = normalize_path(&root.join(&self.config_path));

        let build = &mut self.build;
        for dir in [
            &mut build.configs,
            &mut build.models,
            &mut build.blueprints,
            &mut build.templates,
            &mut build.pages,
            &mut build.static_dir,
            &mut build.output,
        ] {
            *dir = normalize_path(&root.join(&*dir));
        }
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        if self.build.root_page.trim().is_empty() {
            bail!(ConfigError::Validation("[build.root_page] must not be empty".into()));
        }

        if let Some(base_url) = &self.base.url
            && !base_url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[base.url] must start with http:// or https://".into()
            ));
        }

        if self.build.sitemap.enable && self.base.url.is_none() {
            bail!(ConfigError::Validation(
                "[base.url] is required for sitemap generation".into()
            ));
        }

        if self.build.output == self.build.static_dir
            || self.build.static_dir.starts_with(&self.build.output)
        {
            bail!(ConfigError::Validation(
                "[build.static] must not live inside [build.output]".into()
            ));
        }

        Ok(())
    }
}

/// Normalize a path to absolute, using canonicalize if the path exists
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("blueprint").chain(args.iter().copied()))
    }

    #[test]
    fn test_from_str_defaults() {
        let config = SiteConfig::from_str("").unwrap();
        assert_eq!(config.build.root_page, "index");
        assert!(config.base.url.is_none());
    }

    #[test]
    fn test_from_str_sections() {
        let config = SiteConfig::from_str(
            r#"
            [base]
            url = "https://example.com"

            [build]
            output = "public"
            minify = false

            [build.sitemap]
            enable = true
            "#,
        )
        .unwrap();
        assert_eq!(config.base.url.as_deref(), Some("https://example.com"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert!(!config.build.minify);
        assert!(config.build.sitemap.enable);
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(SiteConfig::from_str("[extra]\nfoo = 1").is_err());
    }

    #[test]
    fn test_load_without_config_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let config = SiteConfig::load(&cli(&["--root", root, "build"])).unwrap();

        let root = normalize_path(dir.path());
        assert_eq!(config.build.output, root.join("dist"));
        assert_eq!(config.build.static_dir, root.join("assets/static"));
        assert_eq!(config.image_dir(), root.join("assets/static/img"));
    }

    #[test]
    fn test_load_explicit_missing_config() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let result = SiteConfig::load(&cli(&["--root", root, "-C", "nope.toml", "build"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[build]\nminify = true\n").unwrap();
        let root = dir.path().to_str().unwrap();

        let config = SiteConfig::load(&cli(&[
            "--root", root, "-o", "out", "build", "--minify=false", "--images=false",
        ]))
        .unwrap();
        assert!(!config.build.minify);
        assert!(!config.build.images.enable);
        assert!(config.build.output.ends_with("out"));
    }

    #[test]
    fn test_sitemap_requires_url() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let result = SiteConfig::load(&cli(&["--root", root, "build", "--sitemap"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let mut config = SiteConfig::default();
        config.base.url = Some("example.com".into());
        assert!(config.validate().is_err());
        config.base.url = Some("https://example.com".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_staging_dir_is_sibling() {
        let mut config = SiteConfig::default();
        config.build.output = PathBuf::from("/site/dist");
        assert_eq!(config.staging_dir(), PathBuf::from("/site/.dist.staging"));
    }
}
