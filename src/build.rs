//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── optimize_images()        assets/static/img → raw/, min/, webp/
//!     │
//!     ├── load_documents() ×3      configs/, blueprints/, models/
//!     ├── Resolver::resolve()      → PageRequest[] + Sitemap
//!     ├── PageRenderer::render_all()
//!     │
//!     ├── copy_static()            → <staging>/static
//!     ├── fingerprint_static()     → AssetManifest
//!     ├── bust_cache()             rewrite + minify every page
//!     ├── build_sitemap()
//!     │
//!     └── publish()                <staging> replaces <output>
//! ```
//!
//! Everything after image optimization is written into a staging directory.
//! The previous output is only replaced once every stage has succeeded.

use crate::{
    compiler::{
        FsWriter, JinjaRenderer, PageRenderer, bust_cache, copy_static, fingerprint_static,
    },
    config::SiteConfig,
    data::load_documents,
    generator::build_sitemap,
    images::optimize_images,
    log,
    route::{Blueprint, Model, Resolver},
};
use anyhow::{Context, Result};
use std::{fs, path::Path, time::Instant};

/// Name of the static directory inside the output.
pub const STATIC_OUT: &str = "static";

/// Build the entire site into `[build].output`.
///
/// On failure the staging directory is removed and the previous output is
/// left untouched.
pub fn build_site(config: &SiteConfig) -> Result<()> {
    let start = Instant::now();
    let staging = config.staging_dir();

    optimize_images(config).context("image optimization failed")?;

    let result = build_into(config, &staging).and_then(|pages| {
        publish(&staging, &config.build.output)?;
        Ok(pages)
    });

    match result {
        Ok(pages) => {
            log!("build"; "{pages} pages in {:.2?}", start.elapsed());
            Ok(())
        }
        Err(e) => {
            remove_dir_if_exists(&staging).ok();
            Err(e)
        }
    }
}

/// Run every output-producing stage against `out`. Returns the page count.
fn build_into(config: &SiteConfig, out: &Path) -> Result<usize> {
    let build = &config.build;
    remove_dir_if_exists(out)?;
    fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;

    // ========================================================================
    // Data
    // ========================================================================
    let app = load_documents(&build.configs)?;
    let blueprints = Blueprint::parse_all(&load_documents(&build.blueprints)?)?;
    let models = Model::parse_all(&load_documents(&build.models)?)?;

    let resolution = Resolver::new(out, &build.root_page)
        .with_reserved(STATIC_OUT)
        .resolve(&app, &blueprints, &models)?;
    log!("route"; "{} pages, {} in sitemap", resolution.requests.len(), resolution.sitemap.len());

    // ========================================================================
    // Pages
    // ========================================================================
    let renderer = JinjaRenderer::from_dir(&build.templates);
    let mut pages = PageRenderer::new(renderer, FsWriter).with_markdown_pages(&build.pages);
    let count = pages.render_all(&resolution.requests)?;

    // ========================================================================
    // Assets
    // ========================================================================
    let static_out = out.join(STATIC_OUT);
    copy_static(&build.static_dir, &static_out)?;
    let manifest = fingerprint_static(&static_out)?;
    if !manifest.is_empty() {
        log!("assets"; "fingerprinted {} files", manifest.len());
    }
    bust_cache(out, &manifest, build.minify)?;

    build_sitemap(config, &resolution.sitemap, out)?;
    Ok(count)
}

/// Swap the staged build into place.
fn publish(staging: &Path, output: &Path) -> Result<()> {
    remove_dir_if_exists(output)?;
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(staging, output).with_context(|| {
        format!("failed to move {} to {}", staging.display(), output.display())
    })
}

fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).with_context(|| format!("failed to remove {}", dir.display()))?;
    }
    Ok(())
}
