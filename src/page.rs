//! Defines the [`Page`] type, the per-page data record the build pipeline
//! reads and writes, and the logic for loading pages from markdown source
//! files. A source file is a `---`-fenced YAML frontmatter block followed by
//! a markdown body; the body is rendered to HTML at load time, so every step
//! downstream of loading sees the page's final content string.

use pulldown_cmark::{html, Options, Parser};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;
use walkdir::WalkDir;

pub const MARKDOWN_EXTENSION: &str = ".md";

/// A content page's in-memory record. Structured attributes the theme works
/// with are real fields; everything else an author puts in frontmatter rides
/// along in `extra` untouched.
#[derive(Clone, Debug)]
pub struct Page {
    /// The page's identifier: its source path relative to the source root,
    /// without the markdown extension.
    pub id: String,

    /// The site-relative URL, directory-style: `/{id}/`.
    pub url: String,

    pub title: String,

    /// The page's `type` attribute. Pages under `posts/` default to `post`,
    /// everything else to `page`; frontmatter overrides both.
    pub kind: String,

    /// The post date as written (`YYYY-MM-DD`), if any. The `date` pipeline
    /// step fills and normalizes this field.
    pub date: Option<String>,

    pub tags: Vec<String>,

    /// The source file extension, used by preprocessor content-type filters.
    pub extension: String,

    /// The body, rendered to its final HTML string form.
    pub content: String,

    /// The page summary. Authors can set it in frontmatter; otherwise the
    /// excerpt preprocessor derives it from `content`.
    pub excerpt: Option<String>,

    /// Frontmatter keys the theme has no structured field for.
    pub extra: BTreeMap<String, Value>,
}

#[derive(Deserialize, Default)]
struct FrontMatter {
    #[serde(default)]
    title: String,

    #[serde(default, rename = "type")]
    kind: Option<String>,

    #[serde(default)]
    date: Option<String>,

    #[serde(default)]
    tags: Vec<String>,

    #[serde(default)]
    excerpt: Option<String>,

    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl Page {
    /// Parses a page from source text: frontmatter first (if present), then
    /// the markdown body rendered to HTML.
    pub fn from_str(id: &str, input: &str) -> Result<Page> {
        let (frontmatter, body) = split_frontmatter(id, input)?;
        let frontmatter: FrontMatter = match frontmatter {
            // an empty fenced block is valid and means the same as no
            // frontmatter at all
            Some(yaml) if !yaml.trim().is_empty() => {
                serde_yaml::from_str(yaml).map_err(|err| Error::FrontMatter {
                    id: id.to_owned(),
                    err,
                })?
            }
            _ => FrontMatter::default(),
        };

        let mut content = String::new();
        html::push_html(&mut content, Parser::new_ext(body, markdown_options()));

        Ok(Page {
            id: id.to_owned(),
            url: format!("/{}/", id),
            title: frontmatter.title,
            kind: frontmatter
                .kind
                .unwrap_or_else(|| default_kind(id).to_owned()),
            date: frontmatter.date,
            tags: frontmatter.tags,
            extension: MARKDOWN_EXTENSION.to_owned(),
            content,
            excerpt: frontmatter.excerpt,
            extra: frontmatter.extra,
        })
    }

    /// The values a named multi-value attribute takes on this page. `tags`
    /// and `type` resolve to structured fields; anything else resolves
    /// through the frontmatter pass-through map.
    pub fn attr_values(&self, attr: &str) -> Vec<&str> {
        match attr {
            "tags" => self.tags.iter().map(String::as_str).collect(),
            "type" => vec![self.kind.as_str()],
            _ => match self.extra.get(attr) {
                Some(Value::String(s)) => vec![s.as_str()],
                Some(Value::Sequence(seq)) => seq.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            },
        }
    }
}

/// The shared `type` for a page based on where it lives, mirroring the data
/// files the theme ships for its `posts/` directory.
fn default_kind(id: &str) -> &'static str {
    if id.starts_with("posts/") {
        "post"
    } else {
        "page"
    }
}

fn split_frontmatter<'a>(id: &str, input: &'a str) -> Result<(Option<&'a str>, &'a str)> {
    const FENCE: &str = "---";
    if !input.starts_with(FENCE) {
        return Ok((None, input));
    }
    match input[FENCE.len()..].find(FENCE) {
        None => Err(Error::UnterminatedFrontMatter { id: id.to_owned() }),
        Some(offset) => Ok((
            Some(&input[FENCE.len()..FENCE.len() + offset]),
            &input[FENCE.len() + offset + FENCE.len()..],
        )),
    }
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Walks `dir` and parses every markdown file into a [`Page`]. Entries load
/// in sorted path order so a build pass always sees an unchanged corpus in
/// the same order.
pub fn load_pages(dir: &Path) -> Result<Vec<Page>> {
    let mut pages = Vec::new();
    for result in WalkDir::new(dir).sort_by_file_name() {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        // strip_prefix shouldn't fail since `dir` is always an ancestor of
        // the entry's path
        let relative = entry.path().strip_prefix(dir).unwrap();
        let relative = relative.to_string_lossy();
        if !relative.ends_with(MARKDOWN_EXTENSION) {
            continue;
        }
        let id = relative.trim_end_matches(MARKDOWN_EXTENSION);
        let mut contents = String::new();
        File::open(entry.path())?.read_to_string(&mut contents)?;
        pages.push(Page::from_str(id, &contents)?);
    }
    Ok(pages)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading pages from a source tree.
#[derive(Debug)]
pub enum Error {
    /// Returned when a page's frontmatter block is not valid YAML.
    FrontMatter { id: String, err: serde_yaml::Error },

    /// Returned when a page opens a frontmatter fence and never closes it.
    UnterminatedFrontMatter { id: String },

    /// Returned for problems walking the source directory.
    Walk(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontMatter { id, err } => {
                write!(f, "Parsing frontmatter for page '{}': {}", id, err)
            }
            Error::UnterminatedFrontMatter { id } => {
                write!(f, "Page '{}' is missing its closing `---`", id)
            }
            Error::Walk(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontMatter { id: _, err } => Some(err),
            Error::UnterminatedFrontMatter { id: _ } => None,
            Error::Walk(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::Walk(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frontmatter() -> Result<()> {
        let page = Page::from_str(
            "posts/hello",
            "---\ntitle: Hello\ntags: [rust, blogging]\n---\n\nBody text.",
        )?;
        assert_eq!("Hello", page.title);
        assert_eq!("post", page.kind);
        assert_eq!(vec!["rust", "blogging"], page.tags);
        assert_eq!("/posts/hello/", page.url);
        assert!(page.content.contains("Body text."));
        assert!(page.excerpt.is_none());
        Ok(())
    }

    #[test]
    fn test_parse_without_frontmatter() -> Result<()> {
        let page = Page::from_str("404", "# Not found\n")?;
        assert_eq!("page", page.kind);
        assert_eq!("", page.title);
        assert!(page.content.contains("Not found"));
        Ok(())
    }

    #[test]
    fn test_empty_frontmatter_block() -> Result<()> {
        let page = Page::from_str("posts/blank", "---\n---\nbody")?;
        assert_eq!("", page.title);
        assert_eq!("post", page.kind);
        assert!(page.tags.is_empty());
        assert!(page.content.contains("body"));

        let page = Page::from_str("posts/blank", "---\n   \n---\nbody")?;
        assert_eq!("", page.title);
        Ok(())
    }

    #[test]
    fn test_frontmatter_type_override() -> Result<()> {
        let page = Page::from_str("about", "---\ntitle: About\ntype: post\n---\nbody")?;
        assert_eq!("post", page.kind);
        Ok(())
    }

    #[test]
    fn test_unterminated_frontmatter() {
        match Page::from_str("posts/broken", "---\ntitle: Broken\n") {
            Err(Error::UnterminatedFrontMatter { id }) => assert_eq!("posts/broken", id),
            other => panic!("wanted UnterminatedFrontMatter; found {:?}", other.is_ok()),
        }
    }

    #[test]
    fn test_extra_keys_pass_through() -> Result<()> {
        let page = Page::from_str("posts/extra", "---\ntitle: T\nauthor: someone\n---\nbody")?;
        assert_eq!(
            Some(&serde_yaml::Value::String("someone".to_owned())),
            page.extra.get("author"),
        );
        assert_eq!(vec!["someone"], page.attr_values("author"));
        Ok(())
    }

    #[test]
    fn test_marker_comment_survives_rendering() -> Result<()> {
        let page = Page::from_str(
            "posts/folded",
            "---\ntitle: T\n---\nIntro.\n\n<!-- more -->\n\nRest.",
        )?;
        assert!(page.content.contains("<!-- more -->"));
        Ok(())
    }

    #[test]
    fn test_load_pages_sorted() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir(dir.path().join("posts"))?;
        std::fs::write(dir.path().join("posts/b.md"), "---\ntitle: B\n---\nb")?;
        std::fs::write(dir.path().join("posts/a.md"), "---\ntitle: A\n---\na")?;
        std::fs::write(dir.path().join("notes.txt"), "not a page")?;
        let pages = load_pages(dir.path())?;
        let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(vec!["posts/a", "posts/b"], ids);
        Ok(())
    }
}
