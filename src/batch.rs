//! Per-file driver: one `TransformedFile` record for each input, converted in
//! parallel. A failing file only fails its own record.

use std::sync::OnceLock;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::format::{format_or_passthrough, Formatter};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInput {
    pub id: String,
    pub name: String,
    pub path: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedFile {
    pub id: String,
    pub name: String,
    pub path: String,
    /// Original text, formatted for display when possible.
    pub content: String,
    /// Empty when `error` is set.
    pub converted: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub is_root: bool,
}

fn create_element_call() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bcreateElement\s*\(").expect("valid pattern"))
}

pub fn has_create_element(content: &str) -> bool {
    create_element_call().is_match(content)
}

/// The first file, in input order, with a `createElement(` call site.
pub fn find_root_file(files: &[SourceInput]) -> Option<usize> {
    files.iter().position(|f| has_create_element(&f.content))
}

fn transform_one(
    file: SourceInput,
    config: &Config,
    formatter: &dyn Formatter,
    is_root: bool,
) -> TransformedFile {
    let (content, converted, error) = match crate::convert(&file.content, config) {
        Ok(code) => (
            format_or_passthrough(formatter, &file.content),
            format_or_passthrough(formatter, &code),
            None,
        ),
        Err(e) => {
            tracing::warn!(file = %file.path, error = %e, "failed to transform");
            (file.content, String::new(), Some(e.to_string()))
        }
    };
    TransformedFile {
        id: file.id,
        name: file.name,
        path: file.path,
        content,
        converted,
        error,
        is_root,
    }
}

/// Results come back in input order.
pub fn transform_files(
    files: Vec<SourceInput>,
    config: &Config,
    formatter: &dyn Formatter,
) -> Vec<TransformedFile> {
    let root = find_root_file(&files);
    let results: Vec<TransformedFile> = files
        .into_par_iter()
        .enumerate()
        .map(|(i, file)| transform_one(file, config, formatter, root == Some(i)))
        .collect();

    let failed = results.iter().filter(|f| f.error.is_some()).count();
    tracing::info!(
        files = results.len(),
        failed,
        root = root.map(|i| results[i].name.as_str()).unwrap_or("-"),
        "transformed batch"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::NoopFormatter;

    fn input(id: &str, content: &str) -> SourceInput {
        SourceInput {
            id: id.into(),
            name: format!("{id}.js"),
            path: format!("assets/{id}.js"),
            content: content.into(),
        }
    }

    #[test]
    fn root_is_first_file_with_create_element() {
        let files = vec![
            input("a", "export const x = 1;"),
            input("b", "const e = React.createElement('div');"),
            input("c", "const f = t.createElement ('p');"),
        ];
        assert_eq!(find_root_file(&files), Some(1));
        assert!(!has_create_element("const createElements = 1;"));
    }

    #[test]
    fn record_serializes_camel_case() {
        let file = TransformedFile {
            id: "1".into(),
            name: "a.js".into(),
            path: "a.js".into(),
            content: "x".into(),
            converted: "x".into(),
            error: None,
            is_root: true,
        };
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["isRoot"], serde_json::Value::Bool(true));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failures_are_isolated() {
        let files = vec![input("ok", "x = React.createElement('br');"), input("bad", "x = {")];
        let out = transform_files(files, &Config::default(), &NoopFormatter);
        assert_eq!(out.len(), 2);
        assert!(out[0].error.is_none());
        assert!(out[0].is_root);
        assert!(out[0].converted.contains("<br"));
        assert!(out[1].error.as_deref().unwrap_or_default().starts_with("parse failed"));
        assert!(out[1].converted.is_empty());
        assert_eq!(out[1].content, "x = {");
    }
}
