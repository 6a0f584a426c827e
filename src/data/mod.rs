//! Structured site data: document loading and page contexts.
//!
//! Every directory of YAML documents (`configs/`, `models/`, `blueprints/`)
//! is loaded the same way: files in filename order, each a mapping, merged
//! shallowly with later files winning.
//!
//! ```text
//! configs/00-site.yaml   { site: "X", nav: [...] }
//! configs/10-local.yaml  { site: "Y" }
//!                 ─────► { site: "Y", nav: [...] }
//! ```

mod context;
mod store;

pub use context::{Context, merge, scalar_to_string};
pub use store::load_documents;
