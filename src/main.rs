//! Blueprint - a declarative static site generator.
//!
//! Blueprints and content models in YAML, Jinja templates, one rendered site out.

mod build;
mod cli;
mod compiler;
mod config;
mod data;
mod generator;
mod images;
mod route;
mod utils;
mod watch;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::Cli;
use config::SiteConfig;
use watch::watch_for_changes_blocking;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SiteConfig::load(&cli)?;

    if cli.is_watch() {
        watch_for_changes_blocking(&config)
    } else {
        build_site(&config)
    }
}
