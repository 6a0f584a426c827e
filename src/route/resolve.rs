//! Expansion of blueprints and models into page requests.

use super::path::path_for;
use super::spec::{
    Blueprint, BlueprintValue, GROUP_WILDCARD, ITEM_WILDCARD, Model, PageSpec,
};
use crate::data::{Context, merge, scalar_to_string};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Context key holding the resolved page name.
pub const PAGE_NAME_KEY: &str = "page_name";

/// Errors that make a set of specs unbuildable.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("page name `{page}` (template `{template}`) is not a valid output path")]
    InvalidPageName { template: String, page: String },

    #[error("`{}` is produced by both page `{first}` and page `{second}`", path.display())]
    DuplicateOutput {
        path: PathBuf,
        first: String,
        second: String,
    },

    #[error("page `{page}` would be written inside `{dir}`, which the build replaces")]
    ReservedOutput { page: String, dir: String },

    #[error("model `{model}`, item `{item}`: `{field}` must be a scalar or a sequence of scalars")]
    InvalidTags {
        model: String,
        item: String,
        field: String,
    },
}

/// One page to render.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Template id (`<templates>/<template>.jinja2`).
    pub template: String,
    pub page_name: String,
    /// App config merged with page data, plus `page_name`.
    pub context: Context,
    pub output: PathBuf,
}

/// Page names in emission order.
///
/// One-to-one blueprint pages are not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sitemap(Vec<String>);

impl Sitemap {
    pub fn push(&mut self, page_name: impl Into<String>) {
        self.0.push(page_name.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything a build renders.
#[derive(Debug, Default)]
pub struct Resolution {
    pub requests: Vec<PageRequest>,
    pub sitemap: Sitemap,
}

/// Resolves specs against an output directory.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    output: &'a Path,
    root_page: &'a str,
    reserved: Option<&'a str>,
}

impl<'a> Resolver<'a> {
    pub const fn new(output: &'a Path, root_page: &'a str) -> Self {
        Self {
            output,
            root_page,
            reserved: None,
        }
    }

    /// Refuse pages under `<output>/<dir>`, a directory owned by a later
    /// build stage.
    pub const fn with_reserved(mut self, dir: &'a str) -> Self {
        self.reserved = Some(dir);
        self
    }

    /// Expand all blueprints, then all models.
    ///
    /// # Errors
    /// Fails on an unusable page name, on tags that are not scalars, when a
    /// page lands in the reserved directory, and when two pages would be
    /// written to the same path.
    pub fn resolve(
        &self,
        app: &Context,
        blueprints: &[Blueprint],
        models: &[Model],
    ) -> Result<Resolution, ResolveError> {
        let mut emitter = Emitter::new(*self);

        for blueprint in blueprints {
            emitter.blueprint(app, blueprint)?;
        }
        for model in models {
            for (template, spec) in &model.templates {
                emitter.model_template(app, model, template, spec)?;
            }
        }

        Ok(emitter.finish())
    }
}

/// Accumulates requests and guards output uniqueness.
struct Emitter<'a> {
    resolver: Resolver<'a>,
    resolution: Resolution,
    /// output path → page name that claimed it
    claimed: FxHashMap<PathBuf, String>,
}

impl<'a> Emitter<'a> {
    fn new(resolver: Resolver<'a>) -> Self {
        Self {
            resolver,
            resolution: Resolution::default(),
            claimed: FxHashMap::default(),
        }
    }

    fn finish(self) -> Resolution {
        self.resolution
    }

    fn emit(
        &mut self,
        template: &str,
        page_name: String,
        mut context: Context,
        in_sitemap: bool,
    ) -> Result<(), ResolveError> {
        let Resolver {
            output,
            root_page,
            reserved,
        } = self.resolver;
        let path = path_for(output, &page_name, root_page).ok_or_else(|| {
            ResolveError::InvalidPageName {
                template: template.to_owned(),
                page: page_name.clone(),
            }
        })?;

        if let Some(dir) = reserved.filter(|dir| path.starts_with(output.join(dir))) {
            return Err(ResolveError::ReservedOutput {
                page: page_name,
                dir: dir.to_owned(),
            });
        }

        if let Some(first) = self.claimed.get(&path) {
            return Err(ResolveError::DuplicateOutput {
                path,
                first: first.clone(),
                second: page_name,
            });
        }
        self.claimed.insert(path.clone(), page_name.clone());

        context.insert(PAGE_NAME_KEY.to_owned(), Value::String(page_name.clone()));
        if in_sitemap {
            self.resolution.sitemap.push(page_name.as_str());
        }
        self.resolution.requests.push(PageRequest {
            template: template.to_owned(),
            page_name,
            context,
            output: path,
        });
        Ok(())
    }

    fn blueprint(&mut self, app: &Context, blueprint: &Blueprint) -> Result<(), ResolveError> {
        let template = &blueprint.template;
        match &blueprint.value {
            BlueprintValue::Single(options) => {
                self.emit(template, template.clone(), merge(app, options), false)
            }
            BlueprintValue::Many(pages) => pages.iter().try_for_each(|(page_name, options)| {
                self.emit(template, page_name.clone(), merge(app, options), true)
            }),
        }
    }

    fn model_template(
        &mut self,
        app: &Context,
        model: &Model,
        template: &str,
        spec: &PageSpec,
    ) -> Result<(), ResolveError> {
        match spec {
            PageSpec::List { output } => {
                let mut page = Context::new();
                page.insert("items".into(), Value::Object(model.items.clone()));
                self.emit(template, output.clone(), merge(app, &page), true)
            }
            PageSpec::Detail { pattern, .. } => {
                for (key, item) in items_of(model) {
                    let page_name = pattern.replace(ITEM_WILDCARD, key);
                    self.emit(template, page_name, merge(app, item), true)?;
                }
                Ok(())
            }
            PageSpec::Archive { field, pattern } => {
                for (tag, kvs) in group_by_tag(model, field)? {
                    let mut page = Context::new();
                    page.insert("kvs".into(), Value::Array(kvs));
                    page.insert("title".into(), Value::String(tag.clone()));
                    let page_name = pattern.replace(GROUP_WILDCARD, &tag);
                    self.emit(template, page_name, merge(app, &page), true)?;
                }
                Ok(())
            }
        }
    }
}

/// Items of a model; non-mapping items were rejected at parse time.
fn items_of(model: &Model) -> impl Iterator<Item = (&String, &Context)> {
    model
        .items
        .iter()
        .filter_map(|(key, item)| item.as_object().map(|item| (key, item)))
}

/// Bucket items by the tags found at `item[field]`.
///
/// Buckets are ordered by first appearance; each holds the items carrying
/// that tag, in item order, annotated with their own `key`.
fn group_by_tag(model: &Model, field: &str) -> Result<Vec<(String, Vec<Value>)>, ResolveError> {
    let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for (key, item) in items_of(model) {
        let tags = tags_of(item.get(field)).ok_or_else(|| ResolveError::InvalidTags {
            model: model.name.clone(),
            item: key.clone(),
            field: field.to_owned(),
        })?;
        if tags.is_empty() {
            continue;
        }

        let mut annotated = item.clone();
        annotated.insert("key".into(), Value::String(key.clone()));
        let annotated = Value::Object(annotated);

        for tag in tags {
            let slot = *index.entry(tag.clone()).or_insert_with(|| {
                groups.push((tag, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(annotated.clone());
        }
    }

    Ok(groups)
}

/// Tags held by a field: a missing/null field has none, a scalar is one tag.
fn tags_of(value: Option<&Value>) -> Option<Vec<String>> {
    match value {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::Array(tags)) => tags.iter().map(scalar_to_string).collect(),
        Some(Value::Object(_)) => None,
        Some(scalar) => scalar_to_string(scalar).map(|tag| vec![tag]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OUT: &str = "/dist";

    fn ctx(value: Value) -> Context {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn resolve(app: Value, blueprints: Value, models: Value) -> Result<Resolution, ResolveError> {
        let blueprints = Blueprint::parse_all(&ctx(blueprints)).unwrap();
        let models = Model::parse_all(&ctx(models)).unwrap();
        Resolver::new(Path::new(OUT), "index").resolve(&ctx(app), &blueprints, &models)
    }

    fn sitemap(resolution: &Resolution) -> Vec<&str> {
        resolution.sitemap.iter().collect()
    }

    #[test]
    fn test_one_to_one() {
        let res = resolve(json!({"site": "X", "opt": 0}), json!({"k": {"opt": 1}}), json!({})).unwrap();

        assert_eq!(res.requests.len(), 1);
        let page = &res.requests[0];
        assert_eq!(page.template, "k");
        assert_eq!(page.output, PathBuf::from("/dist/k/index.html"));
        assert_eq!(page.context["opt"], 1);
        assert_eq!(page.context["site"], "X");
        assert_eq!(page.context[PAGE_NAME_KEY], "k");
        assert!(res.sitemap.is_empty());
    }

    #[test]
    fn test_one_to_many_order() {
        let res = resolve(
            json!({}),
            json!({"legal": [{"privacy": {"t": 1}}, {"terms": null}, {"cookies": {}}]}),
            json!({}),
        )
        .unwrap();

        assert_eq!(res.requests.len(), 3);
        assert!(res.requests.iter().all(|r| r.template == "legal"));
        assert_eq!(sitemap(&res), ["privacy", "terms", "cookies"]);
        assert_eq!(res.requests[1].output, PathBuf::from("/dist/terms/index.html"));
        assert_eq!(res.requests[0].context["t"], 1);
    }

    #[test]
    fn test_root_page() {
        let res = resolve(json!({}), json!({"index": {}}), json!({})).unwrap();
        assert_eq!(res.requests[0].output, PathBuf::from("/dist/index.html"));
        assert_eq!(res.requests[0].context[PAGE_NAME_KEY], "index");
    }

    #[test]
    fn test_list_view() {
        let res = resolve(
            json!({"site": "X"}),
            json!({}),
            json!({"posts": {
                "templates": {"post_list": "blog"},
                "items": {"p1": {"t": 1}, "p2": {"t": 2}}
            }}),
        )
        .unwrap();

        assert_eq!(res.requests.len(), 1);
        let page = &res.requests[0];
        assert_eq!(page.template, "post_list");
        assert_eq!(page.output, PathBuf::from("/dist/blog/index.html"));
        assert_eq!(page.context["items"], json!({"p1": {"t": 1}, "p2": {"t": 2}}));
        assert_eq!(page.context["site"], "X");
        assert_eq!(sitemap(&res), ["blog"]);
    }

    #[test]
    fn test_detail_per_item() {
        let res = resolve(
            json!({"site": "X"}),
            json!({}),
            json!({"posts": {
                "templates": {"post": {"slug": "blog/*"}},
                "items": {"p1": {"title": "A"}, "p2": {"title": "B"}, "p3": {"title": "C"}}
            }}),
        )
        .unwrap();

        assert_eq!(res.requests.len(), 3);
        for (request, key) in res.requests.iter().zip(["p1", "p2", "p3"]) {
            assert_eq!(request.page_name, format!("blog/{key}"));
            assert_eq!(request.output, PathBuf::from(format!("/dist/blog/{key}/index.html")));
            assert_eq!(request.context["site"], "X");
        }
        assert_eq!(res.requests[1].context["title"], "B");
        assert_eq!(sitemap(&res), ["blog/p1", "blog/p2", "blog/p3"]);
    }

    #[test]
    fn test_detail_ignores_search_field() {
        // the field named in the template does not need to exist on items
        let res = resolve(
            json!({}),
            json!({}),
            json!({"posts": {
                "templates": {"post": {"missing": "*"}},
                "items": {"p1": {}}
            }}),
        )
        .unwrap();
        assert_eq!(res.requests[0].page_name, "p1");
    }

    #[test]
    fn test_archive_multi_tag_membership() {
        let res = resolve(
            json!({}),
            json!({}),
            json!({"posts": {
                "templates": {"tag": {"tags": "tag/[*]"}},
                "items": {
                    "p1": {"tags": ["a", "b"]},
                    "p2": {"tags": ["b"]},
                    "p3": {"tags": ["c"]}
                }
            }}),
        )
        .unwrap();

        assert_eq!(sitemap(&res), ["tag/a", "tag/b", "tag/c"]);

        let keys_of = |page: &str| -> Vec<String> {
            let request = res.requests.iter().find(|r| r.page_name == page).unwrap();
            request.context["kvs"]
                .as_array()
                .unwrap()
                .iter()
                .map(|kv| kv["key"].as_str().unwrap().to_owned())
                .collect()
        };
        assert_eq!(keys_of("tag/a"), ["p1"]);
        assert_eq!(keys_of("tag/b"), ["p1", "p2"]);
        assert_eq!(keys_of("tag/c"), ["p3"]);

        let c_page = res.requests.iter().find(|r| r.page_name == "tag/c").unwrap();
        assert_eq!(c_page.context["title"], "c");
        assert_eq!(c_page.output, PathBuf::from("/dist/tag/c/index.html"));
    }

    #[test]
    fn test_archive_grouping_scoped_per_template() {
        let res = resolve(
            json!({}),
            json!({}),
            json!({
                "posts": {
                    "templates": {"tag": {"tags": "posts/tag/[*]"}},
                    "items": {"p1": {"tags": ["go"]}}
                },
                "notes": {
                    "templates": {"tag": {"tags": "notes/tag/[*]"}},
                    "items": {"n1": {"tags": ["go"]}}
                }
            }),
        )
        .unwrap();

        assert_eq!(res.requests.len(), 2);
        for request in &res.requests {
            assert_eq!(request.context["kvs"].as_array().unwrap().len(), 1);
        }
    }

    #[test]
    fn test_archive_tag_shapes() {
        let res = resolve(
            json!({}),
            json!({}),
            json!({"posts": {
                "templates": {"year": {"year": "archive/[*]"}},
                "items": {"p1": {"year": 2020}, "p2": {}, "p3": {"year": [2020, 2021]}}
            }}),
        )
        .unwrap();
        assert_eq!(sitemap(&res), ["archive/2020", "archive/2021"]);

        let invalid = resolve(
            json!({}),
            json!({}),
            json!({"posts": {
                "templates": {"tag": {"tags": "tag/[*]"}},
                "items": {"p1": {"tags": {"nested": true}}}
            }}),
        );
        assert!(matches!(invalid, Err(ResolveError::InvalidTags { .. })));
    }

    #[test]
    fn test_duplicate_output_rejected() {
        let result = resolve(
            json!({}),
            json!({"about": {}, "misc": [{"about": {}}]}),
            json!({}),
        );
        assert!(matches!(
            result,
            Err(ResolveError::DuplicateOutput { ref first, ref second, .. })
                if first == "about" && second == "about"
        ));
    }

    #[test]
    fn test_invalid_page_name_rejected() {
        let result = resolve(
            json!({}),
            json!({}),
            json!({"posts": {
                "templates": {"tag": {"tags": "tag/[*]"}},
                "items": {"p1": {"tags": [".."]}}
            }}),
        );
        assert!(matches!(result, Err(ResolveError::InvalidPageName { .. })));
    }

    #[test]
    fn test_reserved_dir_rejected() {
        let blueprints = Blueprint::parse_all(&ctx(json!({
            "pages": [{"about": {}}, {"static": {}}]
        })))
        .unwrap();
        let resolver = Resolver::new(Path::new(OUT), "index").with_reserved("static");

        let result = resolver.resolve(&Context::new(), &blueprints, &[]);
        assert!(matches!(
            result,
            Err(ResolveError::ReservedOutput { ref page, .. }) if page == "static"
        ));

        let models = Model::parse_all(&ctx(json!({"files": {
            "templates": {"file": {"slug": "static/*"}},
            "items": {"f1": {}}
        }})))
        .unwrap();
        let result = resolver.resolve(&Context::new(), &[], &models);
        assert!(matches!(result, Err(ResolveError::ReservedOutput { .. })));

        // only the whole segment is reserved
        let blueprints = Blueprint::parse_all(&ctx(json!({"statics": {}}))).unwrap();
        assert!(resolver.resolve(&Context::new(), &blueprints, &[]).is_ok());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let res = resolve(
            json!({"site": "X"}),
            json!({"about": {}}),
            json!({"posts": {
                "templates": {"tags": {"tags": "tag/[*]"}},
                "items": {"p1": {"tags": ["go"]}}
            }}),
        )
        .unwrap();

        assert_eq!(res.requests.len(), 2);

        let about = &res.requests[0];
        assert_eq!(about.output, PathBuf::from("/dist/about/index.html"));
        assert_eq!(Value::Object(about.context.clone()), json!({"site": "X", "page_name": "about"}));

        let tag = &res.requests[1];
        assert_eq!(tag.template, "tags");
        assert_eq!(tag.output, PathBuf::from("/dist/tag/go/index.html"));
        assert_eq!(tag.context["kvs"], json!([{"tags": ["go"], "key": "p1"}]));
        assert_eq!(tag.context["title"], "go");
        assert_eq!(sitemap(&res), ["tag/go"]);
    }
}
