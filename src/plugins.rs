//! The theme's plugin pipeline: the fixed, ordered chain of configuration
//! steps applied to a [`Site`]. Steps the theme owns — post dates, slugified
//! URLs, excerpt folding, tag archives — are wired as real callbacks; the
//! rest (CSS processing, search indexing, feeds, math, highlighting) are
//! recorded declaratively for the host framework to execute.

use crate::archive;
use crate::config::{DateOptions, FeedOptions, KatexOptions, Options};
use crate::excerpt;
use crate::page::Page;
use crate::site::{Error, Site};
use chrono::NaiveDate;
use serde_yaml::Value;
use url::Url;

/// The externally hosted design-system stylesheet registered alongside the
/// plugin chain.
pub const DS_CSS_URL: &str = "https://unpkg.com/@lumeland/ds@0.2.4/ds.css";

/// Applies the plugin chain to `site` in its fixed order.
pub fn install(site: &mut Site, options: &Options) -> Result<(), Error> {
    let date = serde_yaml::to_value(options.date.clone())?;
    let pagefind = options.pagefind.clone().unwrap_or(Value::Null);
    let katex = serde_yaml::to_value(KatexOptions::default())?;
    let feed = serde_yaml::to_value(FeedOptions::default())?;

    site.use_plugin("postcss", Value::Null)
        .use_plugin("base_path", Value::Null)
        .use_plugin("toc", Value::Null)
        .use_plugin("footnotes", Value::Null)
        .use_plugin("prism", Value::Null)
        .use_plugin("date", date)
        .use_plugin("metas", Value::Null)
        .use_plugin("image", Value::Null)
        .use_plugin("resolve_urls", Value::Null)
        .use_plugin("slugify_urls", Value::Null)
        .use_plugin("pagefind", pagefind)
        .use_plugin("terser", Value::Null)
        .use_plugin("sitemap", Value::Null)
        .use_plugin("vento", Value::Null)
        .use_plugin("katex", katex)
        .use_plugin("prism", Value::Null)
        .use_plugin("feed", feed);

    let date_options = options.date.clone();
    site.preprocess(&[], move |page| set_date(page, &date_options));
    site.process_urls(slugify_url);

    site.copy("fonts").copy("favicon.png").copy("image");

    site.preprocess(&[".md"], |page| {
        excerpt::apply(page);
        Ok(())
    });
    site.generate(|search, i18n| Ok(archive::archive_pages(search, i18n)?));

    site.remote_file("_includes/css/ds.css", Url::parse(DS_CSS_URL)?);

    Ok(())
}

/// Fills a page's missing `date` from a `YYYY-MM-DD` filename prefix and
/// normalizes whatever value ends up set against the configured format.
fn set_date(page: &mut Page, options: &DateOptions) -> Result<(), Error> {
    if page.date.is_none() {
        page.date = date_from_id(&page.id);
    }
    if let Some(date) = &page.date {
        let parsed = NaiveDate::parse_from_str(date, &options.format.0).map_err(|err| {
            Error::Date {
                id: page.id.clone(),
                err,
            }
        })?;
        page.date = Some(parsed.format("%Y-%m-%d").to_string());
    }
    Ok(())
}

fn date_from_id(id: &str) -> Option<String> {
    let name = id.rsplit('/').next().unwrap_or(id);
    let prefix = name.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()?;
    Some(prefix.to_owned())
}

/// Slugifies each path segment of a site-relative URL, preserving leading
/// and trailing slashes: `/tag/Rust Lang/` becomes `/tag/rust-lang/`.
fn slugify_url(url: &str) -> String {
    url.split('/')
        .map(|segment| {
            if segment.is_empty() {
                String::new()
            } else {
                slug::slugify(segment)
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DateFormat;
    use std::fs;

    #[test]
    fn test_registration_order() -> Result<(), Error> {
        let mut site = Site::default();
        install(&mut site, &Options::default())?;
        let names: Vec<&str> = site.registrations().iter().map(|r| r.name).collect();
        assert_eq!(
            vec![
                "postcss",
                "base_path",
                "toc",
                "footnotes",
                "prism",
                "date",
                "metas",
                "image",
                "resolve_urls",
                "slugify_urls",
                "pagefind",
                "terser",
                "sitemap",
                "vento",
                "katex",
                "prism",
                "feed",
            ],
            names,
        );
        Ok(())
    }

    #[test]
    fn test_copies_and_remote_stylesheet() -> Result<(), Error> {
        let mut site = Site::default();
        install(&mut site, &Options::default())?;
        assert_eq!(&["fonts", "favicon.png", "image"], site.copies());
        let ds = &site.remote_files()[0];
        assert_eq!("_includes/css/ds.css", ds.path);
        assert_eq!(DS_CSS_URL, ds.source.as_str());
        Ok(())
    }

    #[test]
    fn test_installed_pipeline_builds() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("posts"))?;
        fs::write(
            dir.path().join("posts/2021-03-01_first.md"),
            "---\ntitle: First\ntags: [Rust Lang]\n---\nIntro.\n\n<!-- more -->\n\nRest.",
        )?;
        let mut site = Site::default();
        install(&mut site, &Options::default())?;
        site.build(dir.path())?;

        let page = &site.pages()[0];
        assert_eq!(Some("2021-03-01".to_owned()), page.date);
        assert!(page.excerpt.as_ref().unwrap().contains("Intro."));
        assert!(!page.excerpt.as_ref().unwrap().contains("Rest."));

        let archive = &site.archives()[0];
        assert_eq!("Rust Lang", archive.tag);
        assert_eq!("type=post 'Rust Lang'", archive.search_query);
        // the slugify step rewrites the generated URL after the fact
        assert_eq!("/tag/rust-lang/", archive.url);
        Ok(())
    }

    #[test]
    fn test_set_date_respects_custom_format() -> Result<(), Error> {
        let mut page = Page::from_str("posts/p", "---\ntitle: T\ndate: 01/03/2021\n---\nb")
            .map_err(Error::Page)?;
        let options = DateOptions {
            format: DateFormat(String::from("%d/%m/%Y")),
        };
        set_date(&mut page, &options)?;
        assert_eq!(Some("2021-03-01".to_owned()), page.date);
        Ok(())
    }

    #[test]
    fn test_set_date_rejects_malformed() {
        let mut page = Page::from_str("posts/p", "---\ntitle: T\ndate: yesterday\n---\nb").unwrap();
        match set_date(&mut page, &DateOptions::default()) {
            Err(Error::Date { id, err: _ }) => assert_eq!("posts/p", id),
            other => panic!("wanted Date error; found {:?}", other.is_ok()),
        }
    }

    #[test]
    fn test_date_from_id() {
        assert_eq!(
            Some("2021-03-01".to_owned()),
            date_from_id("posts/2021-03-01_first"),
        );
        assert_eq!(None, date_from_id("posts/first"));
        assert_eq!(None, date_from_id("posts/p"));
    }

    #[test]
    fn test_slugify_url() {
        assert_eq!("/tag/rust-lang/", slugify_url("/tag/Rust Lang/"));
        assert_eq!("/posts/hello/", slugify_url("/posts/hello/"));
    }
}
