//! Route resolution: which pages exist, with what data, at what path.
//!
//! # Expansion Strategies
//!
//! | Source                        | Pages                      | Sitemap |
//! |-------------------------------|----------------------------|---------|
//! | blueprint mapping             | one, named after template  | no      |
//! | blueprint sequence            | one per element            | yes     |
//! | model list view (`"name"`)    | one, with all `items`      | yes     |
//! | model detail (`"x/*"`)        | one per item               | yes     |
//! | model archive (`"x/[*]"`)     | one per distinct tag       | yes     |
//!
//! ```text
//! blueprints/ ─► Blueprint::parse_all ─┐
//!                                       ├─► Resolver::resolve ─► PageRequest[] + Sitemap
//! models/     ─► Model::parse_all     ─┘
//! ```

mod path;
mod resolve;
mod spec;

pub use resolve::{PageRequest, Resolver, Sitemap};
pub use spec::{Blueprint, Model};
