//! Rendering and asset processing for static site generation.
//!
//! - **template**: Jinja templates and Markdown bodies
//! - **output**: where rendered pages are written
//! - **pages**: render `PageRequest`s to HTML files
//! - **assets**: copy static files, fingerprint CSS/JS, bust caches
//! - **manifest**: original → fingerprinted asset names
//!
//! # Build Flow
//!
//! ```text
//! PageRequest[] ──► PageRenderer ──► HTML files ─┐
//!                                                 ├──► bust_cache()
//! static/ ──► copy_static() ──► fingerprint_static() ──► AssetManifest
//! ```

pub mod assets;
pub mod manifest;
pub mod output;
pub mod pages;
pub mod template;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use assets::{bust_cache, copy_static, fingerprint_static};
pub use output::FsWriter;
pub use pages::PageRenderer;
pub use template::JinjaRenderer;

// ============================================================================
// Shared utilities
// ============================================================================

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Collect all files from a directory recursively, in path order.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}
