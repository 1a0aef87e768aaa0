use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Options a consuming site can pass when applying the theme. Every field
/// has a default, so `Options::default()` configures the theme the way it
/// ships.
#[derive(Deserialize, Default, Clone)]
pub struct Options {
    #[serde(default)]
    pub date: DateOptions,

    /// Options forwarded verbatim to the `pagefind` search plugin.
    #[serde(default)]
    pub pagefind: Option<serde_yaml::Value>,
}

impl Options {
    pub fn from_file(path: &Path) -> anyhow::Result<Options> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening options file `{}`: {}", path.display(), e))?;
        Ok(serde_yaml::from_reader(file)?)
    }
}

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct DateOptions {
    /// The `strftime`-style format post dates are written in.
    #[serde(default)]
    pub format: DateFormat,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct DateFormat(pub String);
impl Default for DateFormat {
    fn default() -> Self {
        DateFormat(String::from("%Y-%m-%d"))
    }
}

/// Options for the `katex` math-rendering plugin registration.
#[derive(Serialize, Deserialize, Clone)]
pub struct KatexOptions {
    pub delimiters: Vec<Delimiter>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Delimiter {
    pub left: String,
    pub right: String,
    pub display: bool,
}

impl Default for KatexOptions {
    /// The delimiter set the theme registers: dollar-fenced and bracketed
    /// math plus the common AMS environments, all display-style except the
    /// inline `\( ... \)` pair.
    fn default() -> KatexOptions {
        fn delimiter(left: &str, right: &str, display: bool) -> Delimiter {
            Delimiter {
                left: left.to_owned(),
                right: right.to_owned(),
                display,
            }
        }

        KatexOptions {
            delimiters: vec![
                delimiter("$$", "$$", true),
                delimiter(r"\(", r"\)", false),
                delimiter(r"\begin{equation}", r"\end{equation}", true),
                delimiter(r"\begin{align}", r"\end{align}", true),
                delimiter(r"\begin{alignat}", r"\end{alignat}", true),
                delimiter(r"\begin{gather}", r"\end{gather}", true),
                delimiter(r"\begin{CD}", r"\end{CD}", true),
                delimiter(r"\[", r"\]", true),
            ],
        }
    }
}

/// Options for the `feed` plugin registration.
#[derive(Serialize, Deserialize, Clone)]
pub struct FeedOptions {
    pub output: Vec<String>,
    pub query: String,
    pub info: FeedInfo,
    pub items: FeedItems,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct FeedInfo {
    pub title: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct FeedItems {
    pub title: String,
}

impl Default for FeedOptions {
    /// The feed registration the theme ships: XML and JSON outputs over the
    /// post pages, with titles and descriptions resolved from site metas.
    fn default() -> FeedOptions {
        FeedOptions {
            output: vec!["/feed.xml".to_owned(), "/feed.json".to_owned()],
            query: "type=post".to_owned(),
            info: FeedInfo {
                title: "=metas.site".to_owned(),
                description: "=metas.description".to_owned(),
            },
            items: FeedItems {
                title: "=title".to_owned(),
            },
        }
    }
}
