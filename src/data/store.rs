//! Ordered, lenient loading of YAML document directories.

use super::Context;
use crate::log;
use anyhow::{Context as _, Result};
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Load every document in `dir` and merge them in filename order.
///
/// A file that cannot be read, does not parse, or whose top level is not a
/// mapping contributes nothing and is logged; the merge continues. A missing
/// directory yields an empty mapping.
pub fn load_documents(dir: &Path) -> Result<Context> {
    let mut merged = Context::new();

    if !dir.exists() {
        log!("data"; "{} not found, using no documents", dir.display());
        return Ok(merged);
    }

    for path in sorted_files(dir)? {
        match parse_document(&path) {
            Ok(document) => merged.extend(document),
            Err(reason) => log!("warn"; "skipping {}: {}", path.display(), reason),
        }
    }

    Ok(merged)
}

/// Regular files directly under `dir`, sorted by file name.
fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.path())
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn parse_document(path: &Path) -> Result<Context, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value: Value = serde_yaml_ng::from_str(&text).map_err(|e| e.to_string())?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Err("empty document".into()),
        other => Err(format!("top level is {}, not a mapping", kind_name(&other))),
    }
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
