//! Generated files that are not rendered from templates.

pub mod sitemap;

pub use sitemap::build_sitemap;
