//! Localized strings for the theme: nested, dot-addressed keys loaded from a
//! YAML table, with `{{ name }}` placeholder instantiation for templated
//! labels.

use anyhow::anyhow;
use regex::{Captures, Regex};
use serde_yaml::Value;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::OnceLock;

/// The translation table shipped with the theme. Consuming sites replace it
/// wholesale with [`I18n::from_str`] or [`I18n::from_file`].
const DEFAULT_TABLE: &str = r#"
nav:
  archive: Archive
  search: Search
search:
  placeholder: Search posts
  by_tag: Search posts by the tag {{ tag }}
  no_results: No results found
"#;

pub struct I18n {
    table: Value,
}

impl Default for I18n {
    fn default() -> I18n {
        I18n::from_str(DEFAULT_TABLE).expect("parsing the built-in i18n table")
    }
}

impl I18n {
    pub fn from_str(table: &str) -> Result<I18n, serde_yaml::Error> {
        Ok(I18n {
            table: serde_yaml::from_str(table)?,
        })
    }

    pub fn from_file(path: &Path) -> anyhow::Result<I18n> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening i18n file `{}`: {}", path.display(), e))?;
        Ok(I18n {
            table: serde_yaml::from_reader(file)?,
        })
    }

    /// Looks up a dot-separated key through the nested table, e.g.
    /// `search.by_tag`. The value must be a string; templated labels are
    /// returned as-is, placeholders and all.
    pub fn get(&self, key: &str) -> Result<&str, Error> {
        let mut node = &self.table;
        for part in key.split('.') {
            node = match node {
                Value::Mapping(mapping) => mapping
                    .get(&Value::String(part.to_owned()))
                    .ok_or_else(|| Error::MissingKey(key.to_owned()))?,
                _ => return Err(Error::MissingKey(key.to_owned())),
            };
        }
        match node {
            Value::String(s) => Ok(s),
            _ => Err(Error::NotAString(key.to_owned())),
        }
    }
}

/// Matches a `{{ name }}` placeholder, capturing the name. Whitespace
/// inside the braces is optional.
fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap())
}

/// Substitutes `value` for every `{{ name }}` placeholder in a localized
/// label. Placeholders with other names, and labels without any
/// placeholder, pass through unchanged.
pub fn instantiate(label: &str, name: &str, value: &str) -> String {
    placeholder()
        .replace_all(label, |caps: &Captures| {
            if &caps[1] == name {
                value.to_owned()
            } else {
                caps[0].to_owned()
            }
        })
        .into_owned()
}

/// Represents a failed lookup in the translation table.
#[derive(Debug)]
pub enum Error {
    /// Returned when no value exists under the requested key path.
    MissingKey(String),

    /// Returned when the key path resolves to something other than a string.
    NotAString(String),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingKey(key) => write!(f, "Missing i18n key '{}'", key),
            Error::NotAString(key) => write!(f, "i18n key '{}' is not a string", key),
        }
    }
}

impl std::error::Error for Error {}
