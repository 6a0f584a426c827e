//! Image optimization through external tools.
//!
//! New images are dropped directly into `<static>/img`. A build runs the
//! configured optimizers on them (`--out-dir=<img>/min`), moves the originals
//! to `<img>/raw/` and converts rasters to `<img>/webp/<stem>.webp`. Once moved,
//! an image is never processed again.
//!
//! Every tool failure is a warning: a missing optimizer must not break a build.

use crate::config::{ImagesConfig, SiteConfig};
use crate::utils::exec::is_installed;
use crate::{exec, log};
use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Optimizer output, relative to the image directory.
pub const MIN_DIR: &str = "min";
/// Processed originals.
pub const RAW_DIR: &str = "raw";
/// WebP conversions.
pub const WEBP_DIR: &str = "webp";

/// Extensions converted to WebP.
const RASTER_EXTS: &[&str] = &["png", "jpg", "jpeg"];

/// Process new images under the configured image directory.
///
/// Returns how many images were moved to `raw/`.
pub fn optimize_images(config: &SiteConfig) -> Result<usize> {
    if !config.build.images.enable {
        return Ok(0);
    }
    ImageOptimizer::new(config.image_dir(), &config.build.images).run()
}

struct ImageOptimizer<'a> {
    dir: PathBuf,
    images: &'a ImagesConfig,
    /// Tools already reported missing.
    warned: FxHashSet<String>,
}

impl<'a> ImageOptimizer<'a> {
    fn new(dir: PathBuf, images: &'a ImagesConfig) -> Self {
        Self {
            dir,
            images,
            warned: FxHashSet::default(),
        }
    }

    fn run(mut self) -> Result<usize> {
        let files = self.pending()?;
        if files.is_empty() {
            return Ok(0);
        }
        log!("images"; "optimizing {} images", files.len());

        self.minify(&files);

        let raw_dir = self.dir.join(RAW_DIR);
        let webp_dir = self.dir.join(WEBP_DIR);
        fs::create_dir_all(&raw_dir)?;
        fs::create_dir_all(&webp_dir)?;

        for file in &files {
            let Some(name) = file.file_name() else { continue };
            let raw = raw_dir.join(name);
            move_file(file, &raw)?;

            if is_raster(&raw) {
                let webp = webp_dir.join(name).with_extension("webp");
                if !webp.exists() {
                    self.convert_webp(&raw, &webp);
                }
            }
        }
        Ok(files.len())
    }

    /// Regular files directly under the image directory.
    fn pending(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn minify(&mut self, files: &[PathBuf]) {
        let images = self.images;
        let out_dir = format!("--out-dir={}", self.dir.join(MIN_DIR).display());
        for (ext, cmd) in &images.optimizers {
            let matching: Vec<_> = files.iter().filter(|f| has_ext(f, ext)).collect();
            if matching.is_empty() || !self.available(cmd) {
                continue;
            }
            for file in matching {
                if let Err(e) = exec!(cmd; file, &out_dir) {
                    log!("warn"; "{e}");
                }
            }
        }
    }

    fn convert_webp(&mut self, raw: &Path, webp: &Path) {
        let images = self.images;
        let cmd = &images.webp;
        if !self.available(cmd) {
            return;
        }
        let quality = images.quality.to_string();
        if let Err(e) = exec!(cmd; "-q", quality, raw, "-o", webp) {
            log!("warn"; "{e}");
        }
    }

    /// Whether the tool is on `PATH`; warns once per missing tool.
    fn available(&mut self, cmd: &[String]) -> bool {
        if is_installed(cmd) {
            return true;
        }
        let name = cmd.first().cloned().unwrap_or_default();
        if self.warned.insert(name.clone()) {
            log!("warn"; "`{name}` not found, skipping");
        }
        false
    }
}

fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn is_raster(path: &Path) -> bool {
    RASTER_EXTS.iter().any(|ext| has_ext(path, ext))
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_err() {
        fs::copy(from, to).with_context(|| format!("failed to move {}", from.display()))?;
        fs::remove_file(from)?;
    }
    Ok(())
}

/// Directories created by the optimizer, to be ignored by the watcher.
pub fn generated_dirs(config: &SiteConfig) -> [PathBuf; 3] {
    let dir = config.image_dir();
    [dir.join(MIN_DIR), dir.join(RAW_DIR), dir.join(WEBP_DIR)]
}
