//! Typed blueprint and model specifications.
//!
//! Raw documents are loosely shaped YAML. They are classified here once, at
//! load time, so the resolver only ever matches on enums.
//!
//! # Blueprints
//!
//! ```yaml
//! about:                 # one-to-one: a single page named `about`
//!   title: About
//! legal:                 # one-to-many: one page per element
//!   - privacy: { title: Privacy }
//!   - terms:
//! ```
//!
//! # Models
//!
//! ```yaml
//! posts:
//!   templates:
//!     post_list: blog            # list view       → blog/
//!     post: { slug: "blog/*" }   # per-item detail → blog/<item>/
//!     tag: { tags: "tag/[*]" }   # archive         → tag/<tag>/
//!   items:
//!     p1: { title: Hello, tags: [go] }
//! ```

use crate::data::Context;
use serde_json::Value;
use thiserror::Error;

/// Suffix selecting per-item detail pages.
pub const ITEM_WILDCARD: &str = "*";
/// Suffix selecting grouped archive pages.
pub const GROUP_WILDCARD: &str = "[*]";

/// Malformed blueprint or model documents.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("blueprint `{key}`: {reason}")]
    Blueprint { key: String, reason: String },

    #[error("model `{model}`: {reason}")]
    Model { model: String, reason: String },

    #[error("model `{model}`, template `{template}`: {reason}")]
    Template {
        model: String,
        template: String,
        reason: String,
    },
}

// ============================================================================
// Blueprints
// ============================================================================

/// Value of one blueprint entry.
#[derive(Debug, Clone, PartialEq)]
pub enum BlueprintValue {
    /// Exactly one page, named after the template.
    Single(Context),
    /// One page per `(page name, options)` pair, in document order.
    Many(Vec<(String, Context)>),
}

/// A template plus the pages it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub template: String,
    pub value: BlueprintValue,
}

impl Blueprint {
    /// Classify every entry of the merged blueprint documents.
    pub fn parse_all(documents: &Context) -> Result<Vec<Self>, SpecError> {
        documents
            .iter()
            .map(|(key, value)| Self::parse(key, value))
            .collect()
    }

    fn parse(key: &str, value: &Value) -> Result<Self, SpecError> {
        let err = |reason: String| SpecError::Blueprint {
            key: key.to_owned(),
            reason,
        };

        let value = match value {
            Value::Object(options) => BlueprintValue::Single(options.clone()),
            Value::Null => BlueprintValue::Single(Context::new()),
            Value::Array(pages) => BlueprintValue::Many(
                pages
                    .iter()
                    .enumerate()
                    .map(|(i, page)| parse_named_page(page).map_err(|r| err(format!("page #{i}: {r}"))))
                    .collect::<Result<_, _>>()?,
            ),
            _ => return Err(err("expected a mapping or a sequence of pages".into())),
        };

        Ok(Self {
            template: key.to_owned(),
            value,
        })
    }
}

/// `{pageName: options | null}`
fn parse_named_page(page: &Value) -> Result<(String, Context), String> {
    let (name, options) = single_entry(page)?;
    let options = match options {
        Value::Object(map) => map.clone(),
        Value::Null => Context::new(),
        _ => return Err(format!("options of `{name}` must be a mapping")),
    };
    Ok((name.to_owned(), options))
}

/// The only `(key, value)` of a single-key mapping.
fn single_entry(value: &Value) -> Result<(&str, &Value), String> {
    let Value::Object(map) = value else {
        return Err("expected a single-key mapping".into());
    };
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((key, value)), None) => Ok((key.as_str(), value)),
        (None, _) => Err("expected a single-key mapping, found an empty one".into()),
        (Some(_), Some(_)) => Err(format!(
            "expected a single-key mapping, found {} keys",
            map.len()
        )),
    }
}

// ============================================================================
// Models
// ============================================================================

/// How one model template expands into pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSpec {
    /// `name: output` - one page listing every item.
    List { output: String },
    /// `name: {field: "pattern/*"}` - one page per item. `field` only
    /// selects this shape; it is not read.
    Detail { field: String, pattern: String },
    /// `name: {field: "pattern/[*]"}` - one page per distinct value found in
    /// `item[field]`.
    Archive { field: String, pattern: String },
}

impl PageSpec {
    fn parse(value: &Value) -> Result<Self, String> {
        if let Value::String(output) = value {
            return Ok(Self::List {
                output: output.clone(),
            });
        }

        let (field, pattern) = single_entry(value)?;
        let Value::String(pattern) = pattern else {
            return Err(format!("pattern for `{field}` must be a string"));
        };
        let (field, pattern) = (field.to_owned(), pattern.clone());

        if pattern.ends_with(GROUP_WILDCARD) {
            Ok(Self::Archive { field, pattern })
        } else if pattern.ends_with(ITEM_WILDCARD) {
            Ok(Self::Detail { field, pattern })
        } else {
            Err(format!(
                "pattern `{pattern}` must end with `{ITEM_WILDCARD}` or `{GROUP_WILDCARD}`"
            ))
        }
    }
}

/// A named collection of items and the templates that expand it.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    pub templates: Vec<(String, PageSpec)>,
    pub items: Context,
}

impl Model {
    /// Classify every entry of the merged model documents.
    pub fn parse_all(documents: &Context) -> Result<Vec<Self>, SpecError> {
        documents
            .iter()
            .map(|(name, value)| Self::parse(name, value))
            .collect()
    }

    fn parse(name: &str, value: &Value) -> Result<Self, SpecError> {
        let model_err = |reason: &str| SpecError::Model {
            model: name.to_owned(),
            reason: reason.to_owned(),
        };

        let Value::Object(model) = value else {
            return Err(model_err("expected a mapping with `templates` and `items`"));
        };

        let templates = match model.get("templates") {
            Some(Value::Object(templates)) => templates
                .iter()
                .map(|(template, spec)| {
                    PageSpec::parse(spec)
                        .map(|spec| (template.clone(), spec))
                        .map_err(|reason| SpecError::Template {
                            model: name.to_owned(),
                            template: template.clone(),
                            reason,
                        })
                })
                .collect::<Result<_, _>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => return Err(model_err("`templates` must be a mapping")),
        };

        let items = match model.get("items") {
            Some(Value::Object(items)) => items.clone(),
            Some(Value::Null) | None => Context::new(),
            Some(_) => return Err(model_err("`items` must be a mapping")),
        };
        if let Some((key, _)) = items.iter().find(|(_, item)| !item.is_object()) {
            return Err(model_err(&format!("item `{key}` must be a mapping")));
        }

        Ok(Self {
            name: name.to_owned(),
            templates,
            items,
        })
    }
}
