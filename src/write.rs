use crate::archive::ArchivePage;
use crate::i18n;
use crate::page::Page;
use crate::search::{self, Search};
use crate::site::Site;
use crate::value::{option_to_value, tag_to_value};
use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Responsible for templating built pages and writing the resulting HTML
/// files to disk. Layouts are supplied externally, one per page `type`.
pub struct Writer<'a> {
    /// Layout templates keyed by page `type`. Generated archive pages look
    /// up the `"tag"` layout.
    pub layouts: &'a HashMap<String, Template>,

    /// The directory output files are written under.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Renders and writes every page of a built site: content pages first,
    /// then generated archive pages.
    pub fn write_site(&self, site: &Site) -> Result<()> {
        let search = Search::new(site.pages());
        for page in site.pages() {
            self.write_page(&page.kind, &page.url, Value::from(page))?;
        }
        for archive in site.archives() {
            self.write_page(&archive.kind, &archive.url, archive_value(archive, &search)?)?;
        }
        Ok(())
    }

    fn write_page(&self, kind: &str, url: &str, value: Value) -> Result<()> {
        let layout = self
            .layouts
            .get(kind)
            .ok_or_else(|| Error::MissingLayout(kind.to_owned()))?;
        let path = output_path(self.output_directory, url);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        layout.execute(&mut File::create(&path)?, &Context::from(value)?)?;
        Ok(())
    }
}

/// Builds the template value for an archive page: the descriptor's fields
/// with the title label instantiated with the tag, plus the matching post
/// summaries under `results`.
fn archive_value(archive: &ArchivePage, search: &Search) -> Result<Value> {
    let mut value = Value::from(archive);
    if let Value::Object(obj) = &mut value {
        obj.insert(
            "title".to_owned(),
            Value::String(i18n::instantiate(&archive.title, "tag", &archive.tag)),
        );
        obj.insert(
            "results".to_owned(),
            Value::Array(
                search
                    .pages(&archive.search_query)?
                    .into_iter()
                    .map(summary_value)
                    .collect(),
            ),
        );
    }
    Ok(value)
}

/// The abbreviated value used in archive post lists: enough for a list
/// entry without the full body.
fn summary_value(page: &Page) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("url".to_owned(), Value::String(page.url.clone()));
    m.insert("title".to_owned(), Value::String(page.title.clone()));
    m.insert("date".to_owned(), option_to_value(&page.date));
    m.insert("excerpt".to_owned(), option_to_value(&page.excerpt));
    m.insert(
        "tags".to_owned(),
        Value::Array(page.tags.iter().map(|tag| tag_to_value(tag)).collect()),
    );
    Value::Object(m)
}

/// Maps a site-relative URL to its output file: directory-style URLs get an
/// `index.html`, explicit `.html` URLs map straight through.
fn output_path(output_directory: &Path, url: &str) -> PathBuf {
    let relative = url.trim_start_matches('/');
    if relative.ends_with(".html") {
        output_directory.join(relative)
    } else {
        output_directory.join(relative).join("index.html")
    }
}

/// Loads one or more template files and parses their concatenation into a
/// single layout, so a shared base template can precede each page layout.
pub fn parse_layout<P: AsRef<Path>>(files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for file in files {
        use std::io::Read;
        let file = file.as_ref();
        File::open(file)
            .map_err(|err| Error::OpenLayout {
                path: file.to_owned(),
                err,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::Template)?;
    Ok(template)
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// Returned when no layout is registered for a page's `type`.
    MissingLayout(String),

    /// Returned for I/O problems while opening layout files.
    OpenLayout { path: PathBuf, err: io::Error },

    /// Returned when an archive page's query can't be evaluated.
    Search(search::Error),

    /// An error writing the output files.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::MissingLayout(kind) => {
                write!(f, "No layout registered for page type '{}'", kind)
            }
            Error::OpenLayout { path, err } => {
                write!(f, "Opening layout file '{}': {}", path.display(), err)
            }
            Error::Search(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::MissingLayout(_) => None,
            Error::OpenLayout { path: _, err } => Some(err),
            Error::Search(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`].
    /// This allows us to use the `?` operator for fallible template
    /// operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<search::Error> for Error {
    /// Converts [`search::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: search::Error) -> Error {
        Error::Search(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use std::fs;

    fn template(text: &str) -> Template {
        let mut template = Template::default();
        template.parse(text).unwrap();
        template
    }

    fn layouts() -> HashMap<String, Template> {
        let mut layouts = HashMap::new();
        layouts.insert(
            "post".to_owned(),
            template(
                "<h2>{{ .title }}</h2>{{ .content }}\
                 {{ range .tags }}<a href=\"{{ .url }}\">{{ .tag }}</a>{{ end }}",
            ),
        );
        layouts.insert(
            "tag".to_owned(),
            template("<h1>{{ .title }}</h1>{{ range .results }}<a href=\"{{ .url }}\">{{ .title }}</a>{{ end }}"),
        );
        layouts
    }

    fn built_site(dir: &Path) -> Site {
        fs::create_dir(dir.join("posts")).unwrap();
        fs::write(
            dir.join("posts/2021-03-01_first.md"),
            "---\ntitle: First\ntags: [Rust Lang]\n---\nIntro.\n\n<!-- more -->\n\nRest.",
        )
        .unwrap();
        let mut site = Site::default();
        crate::plugins::install(&mut site, &Options::default()).unwrap();
        site.build(dir).unwrap();
        site
    }

    #[test]
    fn test_write_site() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let source = tempfile::tempdir()?;
        let output = tempfile::tempdir()?;
        let site = built_site(source.path());

        let layouts = layouts();
        let writer = Writer {
            layouts: &layouts,
            output_directory: output.path(),
        };
        writer.write_site(&site)?;

        let post = fs::read_to_string(output.path().join("posts/2021-03-01-first/index.html"))?;
        assert!(post.contains("<h2>First</h2>"));
        // the post's tag link points at the archive page's slugified output
        // URL, not at the raw tag
        assert!(post.contains("href=\"/tag/rust-lang/\""));

        let archive = fs::read_to_string(output.path().join("tag/rust-lang/index.html"))?;
        // the title label is instantiated with the tag at render time
        assert!(archive.contains("Rust Lang"));
        assert!(archive.contains("2021-03-01-first"));
        Ok(())
    }

    #[test]
    fn test_missing_layout() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let site = built_site(source.path());

        let layouts = HashMap::new();
        let writer = Writer {
            layouts: &layouts,
            output_directory: output.path(),
        };
        match writer.write_site(&site) {
            Err(Error::MissingLayout(kind)) => assert_eq!("post", kind),
            other => panic!("wanted MissingLayout; found {:?}", other.is_ok()),
        }
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            PathBuf::from("/out/tag/rust/index.html"),
            output_path(Path::new("/out"), "/tag/rust/"),
        );
        assert_eq!(
            PathBuf::from("/out/feed.html"),
            output_path(Path::new("/out"), "/feed.html"),
        );
        assert_eq!(
            PathBuf::from("/out/index.html"),
            output_path(Path::new("/out"), "/"),
        );
    }

    #[test]
    fn test_parse_layout_concatenates() -> Result<()> {
        let dir = tempfile::tempdir().map_err(Error::Io)?;
        let base = dir.path().join("base.html");
        let page = dir.path().join("page.html");
        std::fs::write(&base, "{{ define \"header\" }}<header></header>{{ end }}")
            .map_err(Error::Io)?;
        std::fs::write(&page, "{{ template \"header\" }}{{ .title }}").map_err(Error::Io)?;
        parse_layout([base, page].iter())?;
        Ok(())
    }
}
