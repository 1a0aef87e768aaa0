//! Exports the [`Site`] build context: the mutable object the theme's
//! ordered configuration steps apply to, and the single build pass that
//! loads pages, runs preprocessors, expands generators, and rewrites URLs.
//! Every page transformation touches only that page's own record, so a pass
//! has no shared mutable state beyond the context itself.

use crate::archive::ArchivePage;
use crate::i18n::{self, I18n};
use crate::page::{self, load_pages, Page};
use crate::search::Search;
use std::fmt;
use std::path::Path;
use url::Url;

type PreprocessFn = Box<dyn Fn(&mut Page) -> Result<()>>;
type GenerateFn = Box<dyn Fn(&Search, &I18n) -> Result<Vec<ArchivePage>>>;
type UrlFn = Box<dyn Fn(&str) -> String>;

/// Records one plugin registration: the plugin's name and the options it
/// was registered with. The host framework replays the recorded sequence in
/// order; the order is part of the theme's contract.
pub struct Registration {
    pub name: &'static str,
    pub options: serde_yaml::Value,
}

/// A preprocessor bound to a set of source extensions. An empty extension
/// list matches every page.
struct Preprocessor {
    extensions: &'static [&'static str],
    apply: PreprocessFn,
}

impl Preprocessor {
    fn matches(&self, page: &Page) -> bool {
        self.extensions.is_empty() || self.extensions.contains(&page.extension.as_str())
    }
}

/// A theme asset registered for the host to fetch: the site-relative path
/// it lands at and the URL it resolves from.
pub struct RemoteFile {
    pub path: String,
    pub source: Url,
}

pub struct Site {
    i18n: I18n,
    pages: Vec<Page>,
    archives: Vec<ArchivePage>,
    registrations: Vec<Registration>,
    preprocessors: Vec<Preprocessor>,
    generators: Vec<GenerateFn>,
    url_steps: Vec<UrlFn>,
    copies: Vec<&'static str>,
    remote_files: Vec<RemoteFile>,
}

impl Default for Site {
    fn default() -> Site {
        Site::new(I18n::default())
    }
}

impl Site {
    pub fn new(i18n: I18n) -> Site {
        Site {
            i18n,
            pages: Vec::new(),
            archives: Vec::new(),
            registrations: Vec::new(),
            preprocessors: Vec::new(),
            generators: Vec::new(),
            url_steps: Vec::new(),
            copies: Vec::new(),
            remote_files: Vec::new(),
        }
    }

    /// Records a plugin registration. Plugins the theme does not implement
    /// itself stay declarative; the host framework consumes them.
    pub fn use_plugin(&mut self, name: &'static str, options: serde_yaml::Value) -> &mut Site {
        self.registrations.push(Registration { name, options });
        self
    }

    /// Registers a preprocessor over pages whose source extension is in
    /// `extensions` (empty matches all). Preprocessors run in registration
    /// order, once per page per build.
    pub fn preprocess<F>(&mut self, extensions: &'static [&'static str], apply: F) -> &mut Site
    where
        F: Fn(&mut Page) -> Result<()> + 'static,
    {
        self.preprocessors.push(Preprocessor {
            extensions,
            apply: Box::new(apply),
        });
        self
    }

    /// Registers a generator of virtual archive pages, run after
    /// preprocessing against a snapshot of the page set.
    pub fn generate<F>(&mut self, generate: F) -> &mut Site
    where
        F: Fn(&Search, &I18n) -> Result<Vec<ArchivePage>> + 'static,
    {
        self.generators.push(Box::new(generate));
        self
    }

    /// Registers a rewrite applied to every page URL, generated archive
    /// pages included, after generation.
    pub fn process_urls<F>(&mut self, step: F) -> &mut Site
    where
        F: Fn(&str) -> String + 'static,
    {
        self.url_steps.push(Box::new(step));
        self
    }

    /// Records a source path copied verbatim into the output.
    pub fn copy(&mut self, path: &'static str) -> &mut Site {
        self.copies.push(path);
        self
    }

    /// Registers a remote theme asset. Fetching is the host's job; the
    /// registry is consumed as an opaque file set.
    pub fn remote_file(&mut self, path: &str, source: Url) -> &mut Site {
        self.remote_files.push(RemoteFile {
            path: path.to_owned(),
            source,
        });
        self
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn archives(&self) -> &[ArchivePage] {
        &self.archives
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn copies(&self) -> &[&'static str] {
        &self.copies
    }

    pub fn remote_files(&self) -> &[RemoteFile] {
        &self.remote_files
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }

    /// Runs one build pass over `source_dir`: load pages, preprocess,
    /// expand generators, rewrite URLs. Re-running over an unchanged source
    /// tree produces an identical page and archive set.
    pub fn build(&mut self, source_dir: &Path) -> Result<()> {
        self.pages = load_pages(source_dir)?;

        for preprocessor in &self.preprocessors {
            for page in &mut self.pages {
                if preprocessor.matches(page) {
                    (preprocessor.apply)(page)?;
                }
            }
        }

        let mut archives = Vec::new();
        {
            let search = Search::new(&self.pages);
            for generate in &self.generators {
                archives.extend(generate(&search, &self.i18n)?);
            }
        }
        self.archives = archives;

        for step in &self.url_steps {
            for page in &mut self.pages {
                page.url = step(&page.url);
            }
            for archive in &mut self.archives {
                archive.url = step(&archive.url);
            }
        }

        Ok(())
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for configuring and building a site.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading pages from the source tree.
    Page(page::Error),

    /// Returned for failed localized-string lookups.
    I18n(i18n::Error),

    /// Returned when a page's date can't be parsed with the configured
    /// format.
    Date {
        id: String,
        err: chrono::ParseError,
    },

    /// Returned when plugin options can't be serialized for registration.
    Options(serde_yaml::Error),

    /// Returned for malformed asset URLs.
    Url(url::ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Page(err) => err.fmt(f),
            Error::I18n(err) => err.fmt(f),
            Error::Date { id, err } => write!(f, "Parsing date for page '{}': {}", id, err),
            Error::Options(err) => write!(f, "Serializing plugin options: {}", err),
            Error::Url(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Page(err) => Some(err),
            Error::I18n(err) => Some(err),
            Error::Date { id: _, err } => Some(err),
            Error::Options(err) => Some(err),
            Error::Url(err) => Some(err),
        }
    }
}

impl From<page::Error> for Error {
    /// Converts [`page::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: page::Error) -> Error {
        Error::Page(err)
    }
}

impl From<i18n::Error> for Error {
    /// Converts [`i18n::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: i18n::Error) -> Error {
        Error::I18n(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts [`serde_yaml::Error`]s into [`Error`]. This allows us to
    /// use the `?` operator.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Options(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts [`url::ParseError`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}
