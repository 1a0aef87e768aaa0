//! Conversions from page records into [`gtmpl`] template values.

use crate::archive::ArchivePage;
use crate::page::Page;
use gtmpl_value::Value;
use std::collections::HashMap;

impl From<&Page> for Value {
    /// Converts a [`Page`] into a [`Value`] for templating. Frontmatter
    /// pass-through keys land alongside the structured fields.
    fn from(page: &Page) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        for (key, value) in &page.extra {
            m.insert(key.clone(), yaml_to_value(value));
        }
        m.insert("url".to_owned(), Value::String(page.url.clone()));
        m.insert("title".to_owned(), Value::String(page.title.clone()));
        m.insert("type".to_owned(), Value::String(page.kind.clone()));
        m.insert("date".to_owned(), option_to_value(&page.date));
        m.insert(
            "tags".to_owned(),
            Value::Array(page.tags.iter().map(|tag| tag_to_value(tag)).collect()),
        );
        m.insert("content".to_owned(), Value::String(page.content.clone()));
        m.insert("excerpt".to_owned(), option_to_value(&page.excerpt));
        Value::Object(m)
    }
}

impl From<&ArchivePage> for Value {
    /// Converts an [`ArchivePage`] descriptor into a [`Value`] for
    /// templating.
    fn from(archive: &ArchivePage) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("url".to_owned(), Value::String(archive.url.clone()));
        m.insert("title".to_owned(), Value::String(archive.title.clone()));
        m.insert("type".to_owned(), Value::String(archive.kind.clone()));
        m.insert(
            "search_query".to_owned(),
            Value::String(archive.search_query.clone()),
        );
        m.insert("tag".to_owned(), Value::String(archive.tag.clone()));
        Value::Object(m)
    }
}

/// Converts a tag name into a template value carrying the tag and its
/// archive URL. The URL segment is slugified so the link matches the
/// archive page's output URL after the `slugify_urls` step has rewritten
/// it.
pub(crate) fn tag_to_value(tag: &str) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("tag".to_owned(), Value::String(tag.to_owned()));
    m.insert(
        "url".to_owned(),
        Value::String(format!("/tag/{}/", slug::slugify(tag))),
    );
    Value::Object(m)
}

pub(crate) fn option_to_value(opt: &Option<String>) -> Value {
    match opt {
        Some(s) => Value::String(s.clone()),
        None => Value::Nil,
    }
}

/// Maps frontmatter pass-through values onto template values. Only the
/// shapes frontmatter produces are mapped; anything else renders as Nil.
fn yaml_to_value(value: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.into(),
            (None, Some(f)) => f.into(),
            (None, None) => Value::Nil,
        },
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(seq) => Value::Array(seq.iter().map(yaml_to_value).collect()),
        Yaml::Mapping(mapping) => {
            let mut m: HashMap<String, Value> = HashMap::new();
            for (key, value) in mapping.iter() {
                if let Yaml::String(key) = key {
                    m.insert(key.clone(), yaml_to_value(value));
                }
            }
            Value::Object(m)
        }
    }
}
