//! Page rendering: one `PageRequest` in, one HTML file out.

use crate::compiler::output::OutputWriter;
use crate::compiler::template::{TemplateRenderer, markdown_to_html, template_file};
use crate::data::Context;
use crate::debug;
use crate::route::PageRequest;
use anyhow::{Context as _, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Context key holding the rendered Markdown body.
pub const BODY_KEY: &str = "body";

/// Renders page requests through a template engine into an output sink.
pub struct PageRenderer<R, W> {
    renderer: R,
    writer: W,
    /// Directory of Markdown body sources, if any.
    pages: Option<PathBuf>,
}

impl<R: TemplateRenderer, W: OutputWriter> PageRenderer<R, W> {
    pub const fn new(renderer: R, writer: W) -> Self {
        Self {
            renderer,
            writer,
            pages: None,
        }
    }

    /// Look up `<dir>/<page_name>.jinja2` as each page's Markdown body.
    pub fn with_markdown_pages(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pages = Some(dir.into());
        self
    }

    /// Render a request to HTML without writing it.
    pub fn render_html(&self, request: &PageRequest) -> Result<String> {
        let mut context = request.context.clone();
        if let Some(body) = self.markdown_body(&request.page_name, &context) {
            context.insert(BODY_KEY.to_owned(), Value::String(body));
        }

        self.renderer
            .render(&request.template, &context)
            .with_context(|| format!("failed to render page `{}`", request.page_name))
    }

    /// Render a request and write it to `request.output`.
    pub fn render(&mut self, request: &PageRequest) -> Result<()> {
        let html = self.render_html(request)?;
        self.writer
            .write(&request.output, html.as_bytes())
            .with_context(|| format!("failed to write {}", request.output.display()))
    }

    /// Render requests in order, stopping at the first failure.
    pub fn render_all(&mut self, requests: &[PageRequest]) -> Result<usize> {
        for request in requests {
            self.render(request)?;
        }
        Ok(requests.len())
    }

    #[cfg(test)]
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Markdown body for `page_name`. Every failure here leaves the page
    /// without a body.
    fn markdown_body(&self, page_name: &str, context: &Context) -> Option<String> {
        let path = self.pages.as_deref()?.join(template_file(page_name));
        if !path.is_file() {
            return None;
        }

        match self.read_markdown(&path, context) {
            Ok(body) => Some(body),
            Err(e) => {
                debug!("pages"; "no body for {page_name}: {e:#}");
                None
            }
        }
    }

    fn read_markdown(&self, path: &Path, context: &Context) -> Result<String> {
        let markdown = fs::read_to_string(path)?;
        let html = markdown_to_html(&markdown);
        Ok(self.renderer.render_str(&html, context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::output::MemoryWriter;
    use crate::compiler::template::JinjaRenderer;
    use serde_json::json;
    use tempfile::TempDir;

    fn request(template: &str, page_name: &str, context: Value, output: &str) -> PageRequest {
        let Value::Object(context) = context else {
            unreachable!()
        };
        PageRequest {
            template: template.into(),
            page_name: page_name.into(),
            context,
            output: PathBuf::from(output),
        }
    }

    fn renderer(sources: &[(&str, &str)]) -> PageRenderer<JinjaRenderer, MemoryWriter> {
        let jinja = JinjaRenderer::from_sources(sources.iter().copied()).unwrap();
        PageRenderer::new(jinja, MemoryWriter::new())
    }

    #[test]
    fn test_render_writes_output() {
        let mut pages = renderer(&[("about", "<h1>{{ site }}</h1><p>{{ page_name }}</p>")]);
        let req = request(
            "about",
            "about",
            json!({"site": "X", "page_name": "about"}),
            "/dist/about/index.html",
        );

        pages.render(&req).unwrap();
        let writer = pages.into_writer();
        assert_eq!(
            writer.get("/dist/about/index.html"),
            Some("<h1>X</h1><p>about</p>")
        );
    }

    #[test]
    fn test_render_missing_template_is_fatal() {
        let mut pages = renderer(&[]);
        let req = request("ghost", "ghost", json!({}), "/dist/ghost/index.html");

        assert!(pages.render(&req).is_err());
        assert!(pages.into_writer().is_empty());
    }

    #[test]
    fn test_render_all_counts() {
        let mut pages = renderer(&[("post", "{{ title }}")]);
        let reqs = vec![
            request("post", "a", json!({"title": "A"}), "/dist/a/index.html"),
            request("post", "b", json!({"title": "B"}), "/dist/b/index.html"),
        ];

        assert_eq!(pages.render_all(&reqs).unwrap(), 2);
        let writer = pages.into_writer();
        assert_eq!(writer.get("/dist/b/index.html"), Some("B"));
    }

    #[test]
    fn test_markdown_body() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("about.jinja2"), "# About {{ site }}\n").unwrap();

        let pages = renderer(&[("about", "<main>{{ body }}</main>")]).with_markdown_pages(dir.path());
        let req = request("about", "about", json!({"site": "X"}), "/dist/about/index.html");

        let html = pages.render_html(&req).unwrap();
        assert!(html.starts_with("<main><h1>About X</h1>"));
        assert!(html.ends_with("</main>"));
    }

    #[test]
    fn test_markdown_body_failure_is_silent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("about.jinja2"), "{% if %}").unwrap();

        let pages = renderer(&[("about", "[{{ body }}]")]).with_markdown_pages(dir.path());
        let req = request("about", "about", json!({}), "/dist/about/index.html");

        assert_eq!(pages.render_html(&req).unwrap(), "[]");
    }

    #[test]
    fn test_no_markdown_source() {
        let dir = TempDir::new().unwrap();
        let pages = renderer(&[("about", "[{{ body }}]")]).with_markdown_pages(dir.path());
        let req = request("about", "about", json!({"body": "kept"}), "/dist/about/index.html");

        assert_eq!(pages.render_html(&req).unwrap(), "[kept]");
    }
}
