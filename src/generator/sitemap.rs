//! Sitemap generation.
//!
//! Lists every page the resolver put on the sitemap, under `[base].url`.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/posts/</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use crate::{config::SiteConfig, log, route, utils::minify::minify_xml};
use anyhow::{Context, Result};
use std::{fs, path::Path};

// ============================================================================
// Constants
// ============================================================================

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

// ============================================================================
// Public API
// ============================================================================

/// Write `<out_dir>/<sitemap.path>` if enabled in config.
pub fn build_sitemap(config: &SiteConfig, pages: &route::Sitemap, out_dir: &Path) -> Result<()> {
    if !config.build.sitemap.enable {
        return Ok(());
    }
    let base_url = config
        .base
        .url
        .as_deref()
        .context("[base.url] is required for sitemap generation")?;

    let lastmod = chrono::Local::now().format("%Y-%m-%d").to_string();
    let sitemap = Sitemap::from_pages(pages, base_url, &config.build.root_page, &lastmod);
    let mut xml = sitemap.into_xml();
    if config.build.minify {
        xml = minify_xml(&xml);
    }

    let path = out_dir.join(&config.build.sitemap.path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, xml)
        .with_context(|| format!("Failed to write sitemap to {}", path.display()))?;

    log!("sitemap"; "{} urls", pages.len());
    Ok(())
}

// ============================================================================
// Sitemap Implementation
// ============================================================================

struct Sitemap {
    urls: Vec<UrlEntry>,
}

struct UrlEntry {
    loc: String,
    lastmod: String,
}

impl Sitemap {
    fn from_pages(pages: &route::Sitemap, base_url: &str, root_page: &str, lastmod: &str) -> Self {
        let urls = pages
            .iter()
            .map(|page| UrlEntry {
                loc: page_url(base_url, page, root_page),
                lastmod: lastmod.to_owned(),
            })
            .collect();
        Self { urls }
    }

    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(256 + self.urls.len() * 96);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", entry.lastmod));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// `https://x.com` + `posts` → `https://x.com/posts/`; the root page maps to `https://x.com/`.
fn page_url(base_url: &str, page: &str, root_page: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if page == root_page {
        format!("{base}/")
    } else {
        format!("{base}/{page}/")
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
