//! Static asset pipeline: copy, fingerprint, cache-bust.
//!
//! ```text
//! assets/static ──copy──► <out>/static
//!                           ├─ css/*.css ──minify+hash──► site.<hash>.css ─┐
//!                           └─ js/*.js   ──minify+hash──► app.<hash>.js   ─┤
//!                                                                           ▼
//! <out>/**/*.html ◄──────────── rewrite names (+ minify-html) ─── AssetManifest
//! ```

use crate::compiler::collect_all_files;
use crate::compiler::manifest::{AssetManifest, Rewriter};
use crate::log;
use crate::utils::minify::{minify_css, minify_html, minify_js};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Hex characters kept from the content hash.
pub const HASH_LEN: usize = 32;

/// Assets that get fingerprinted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Css,
    Js,
}

impl AssetKind {
    /// Subdirectory of the static tree, and file extension.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
        }
    }

    /// Minified text, or `None` when the minifier can't parse it.
    fn minify(self, source: &str) -> Option<String> {
        match self {
            Self::Css => minify_css(source),
            Self::Js => minify_js(source),
        }
    }
}

/// One fingerprinted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedAsset {
    pub original: String,
    pub hashed: String,
}

// ============================================================================
// Copy
// ============================================================================

/// Replace `dst` with a verbatim copy of `src`.
pub fn copy_static(src: &Path, dst: &Path) -> Result<usize> {
    if dst.exists() {
        fs::remove_dir_all(dst).with_context(|| format!("failed to clear {}", dst.display()))?;
    }
    fs::create_dir_all(dst)?;

    if !src.is_dir() {
        log!("assets"; "no static directory at {}", src.display());
        return Ok(0);
    }

    let files = collect_all_files(src);
    for file in &files {
        let rel = file.strip_prefix(src)?;
        let target = dst.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(file, &target)
            .with_context(|| format!("failed to copy {}", file.display()))?;
    }
    Ok(files.len())
}

// ============================================================================
// Fingerprint
// ============================================================================

/// BLAKE3 of `bytes`, as the first [`HASH_LEN`] hex characters.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hex = hex::encode(blake3::hash(bytes).as_bytes());
    hex.truncate(HASH_LEN);
    hex
}

/// `site.css` + `abcd` → `site.abcd.css`
pub fn hashed_name(file_name: &str, hash: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}.{hash}.{ext}"),
        _ => format!("{file_name}.{hash}"),
    }
}

/// Minify, hash and rename one file in place.
pub fn fingerprint_file(path: &Path, kind: AssetKind) -> Result<HashedAsset> {
    let original = file_name(path)?;
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let contents = kind.minify(&source).unwrap_or_else(|| {
        log!("warn"; "could not minify {original}, keeping it as is");
        source
    });

    let hashed = hashed_name(&original, &content_hash(contents.as_bytes()));
    let target = path.with_file_name(&hashed);
    fs::write(&target, &contents).with_context(|| format!("failed to write {}", target.display()))?;
    if target != path {
        fs::remove_file(path)?;
    }

    Ok(HashedAsset { original, hashed })
}

/// Fingerprint the top-level files of `dir` with the kind's extension.
pub fn fingerprint_dir(dir: &Path, kind: AssetKind) -> Result<Vec<HashedAsset>> {
    let files = top_level_files(dir, kind.name())?;
    let mut assets = files
        .par_iter()
        .map(|path| fingerprint_file(path, kind))
        .collect::<Result<Vec<_>>>()?;
    assets.sort_by(|a, b| a.original.cmp(&b.original));
    Ok(assets)
}

/// Fingerprint `<static>/css` then `<static>/js`.
pub fn fingerprint_static(static_out: &Path) -> Result<AssetManifest> {
    let mut manifest = AssetManifest::new();
    for kind in [AssetKind::Css, AssetKind::Js] {
        for asset in fingerprint_dir(&static_out.join(kind.name()), kind)? {
            manifest.insert(asset.original, asset.hashed);
        }
    }
    Ok(manifest)
}

fn top_level_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .with_context(|| format!("invalid asset name: {}", path.display()))
}

// ============================================================================
// Cache busting
// ============================================================================

/// Rewrite asset references in every `*.html` under `output`.
pub fn bust_cache(output: &Path, manifest: &AssetManifest, minify: bool) -> Result<usize> {
    let pages: Vec<_> = collect_all_files(output)
        .into_iter()
        .filter(|p| p.extension().is_some_and(|e| e == "html"))
        .collect();

    let rewriter = manifest
        .rewriter()
        .context("failed to build asset name matcher")?;
    pages
        .par_iter()
        .try_for_each(|path| rewrite_html(path, &rewriter, minify))?;
    Ok(pages.len())
}

fn rewrite_html(path: &Path, rewriter: &Rewriter, minify: bool) -> Result<()> {
    let html =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let html = rewriter.rewrite(&html);
    let bytes = if minify {
        minify_html(html.as_bytes())
    } else {
        html.into_bytes()
    };
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
