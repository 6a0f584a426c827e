//! `[build]` section configuration.
//!
//! Source directories, output layout, minification, sitemap and images.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

/// `[build]` section in blueprint.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// models = "models"       # Content models
/// output = "dist"         # Output directory
/// root_page = "index"     # Written to dist/index.html
/// minify = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// App config documents, merged into every page context.
    #[serde(default = "defaults::build::configs")]
    #[educe(Default = defaults::build::configs())]
    pub configs: PathBuf,

    /// Content model documents.
    #[serde(default = "defaults::build::models")]
    #[educe(Default = defaults::build::models())]
    pub models: PathBuf,

    /// Blueprint documents.
    #[serde(default = "defaults::build::blueprints")]
    #[educe(Default = defaults::build::blueprints())]
    pub blueprints: PathBuf,

    /// Page templates (`<name>.jinja2`).
    #[serde(default = "defaults::build::templates")]
    #[educe(Default = defaults::build::templates())]
    pub templates: PathBuf,

    /// Markdown sources for the optional `body` field (`<page>.jinja2`).
    #[serde(default = "defaults::build::pages")]
    #[educe(Default = defaults::build::pages())]
    pub pages: PathBuf,

    /// Static assets, copied to `<output>/static`.
    #[serde(rename = "static", default = "defaults::build::static_dir")]
    #[educe(Default = defaults::build::static_dir())]
    pub static_dir: PathBuf,

    /// Output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Page name written to `<output>/index.html`.
    #[serde(default = "defaults::build::root_page")]
    #[educe(Default = defaults::build::root_page())]
    pub root_page: String,

    /// Minify generated HTML after cache busting.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify: bool,

    #[serde(default)]
    pub sitemap: SitemapConfig,

    #[serde(default)]
    pub images: ImagesConfig,
}

/// `[build.sitemap]`
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub enable: bool,

    /// Output path, relative to the output directory.
    #[serde(default = "defaults::build::sitemap::path")]
    #[educe(Default = defaults::build::sitemap::path())]
    pub path: PathBuf,
}

/// `[build.images]` - external image optimizer orchestration.
///
/// # Example
/// ```toml
/// [build.images]
/// quality = 75
/// webp = ["cwebp", "-mt"]
///
/// [build.images.optimizers]
/// png = ["oxipng", "-o", "4"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Raw image directory, relative to the static directory.
    #[serde(default = "defaults::build::images::dir")]
    #[educe(Default = defaults::build::images::dir())]
    pub dir: PathBuf,

    /// WebP quality passed to the converter.
    #[serde(default = "defaults::build::images::quality")]
    #[educe(Default = defaults::build::images::quality())]
    pub quality: u8,

    /// WebP converter command.
    #[serde(default = "defaults::build::images::webp")]
    #[educe(Default = defaults::build::images::webp())]
    pub webp: Vec<String>,

    /// File extension → optimizer command. Invoked as
    /// `<cmd...> <file> --out-dir=<dir>/min`.
    #[serde(default = "defaults::build::images::optimizers")]
    #[educe(Default = defaults::build::images::optimizers())]
    pub optimizers: BTreeMap<String, Vec<String>>,
}
