//! Template and Markdown rendering.
//!
//! Templates are Jinja files: template id `post` is `<templates>/post.jinja2`.
//! Output is not auto-escaped and undefined values render empty, matching
//! Jinja2's defaults.

use crate::data::Context;
use minijinja::{AutoEscape, Environment, ErrorKind};
use pulldown_cmark::{Options, Parser, html};
use std::path::Path;
use thiserror::Error;

/// Extension appended to template ids.
pub const TEMPLATE_EXT: &str = "jinja2";

/// Rendering failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template `{0}` not found")]
    TemplateNotFound(String),

    #[error("failed to render `{name}`")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// The rendering engine pages are delegated to.
pub trait TemplateRenderer {
    /// Render the template registered as `template`.
    fn render(&self, template: &str, context: &Context) -> Result<String, RenderError>;

    /// Render an inline template source.
    fn render_str(&self, source: &str, context: &Context) -> Result<String, RenderError>;
}

/// `minijinja` environment loading `<dir>/<id>.jinja2`.
pub struct JinjaRenderer {
    env: Environment<'static>,
}

impl JinjaRenderer {
    /// Load templates lazily from `dir`.
    pub fn from_dir(dir: &Path) -> Self {
        let mut env = Self::environment();
        env.set_loader(minijinja::path_loader(dir));
        Self { env }
    }

    /// Register templates from memory, keyed by template id.
    pub fn from_sources<I, K, V>(sources: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut env = Self::environment();
        for (id, source) in sources {
            let name = template_file(&id.into());
            env.add_template_owned(name.clone(), source.into())
                .map_err(|source| RenderError::Render { name, source })?;
        }
        Ok(Self { env })
    }

    fn environment() -> Environment<'static> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env
    }
}

impl TemplateRenderer for JinjaRenderer {
    fn render(&self, template: &str, context: &Context) -> Result<String, RenderError> {
        let name = template_file(template);
        let tmpl = self.env.get_template(&name).map_err(|source| {
            if source.kind() == ErrorKind::TemplateNotFound {
                RenderError::TemplateNotFound(name.clone())
            } else {
                RenderError::Render {
                    name: name.clone(),
                    source,
                }
            }
        })?;
        tmpl.render(context)
            .map_err(|source| RenderError::Render { name, source })
    }

    fn render_str(&self, source: &str, context: &Context) -> Result<String, RenderError> {
        self.env
            .render_str(source, context)
            .map_err(|source| RenderError::Render {
                name: "<inline>".into(),
                source,
            })
    }
}

/// `post` → `post.jinja2`
pub fn template_file(template: &str) -> String {
    format!("{template}.{TEMPLATE_EXT}")
}

/// Convert Markdown to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
