//! The theme's remote asset manifest: the layouts, stylesheets, fonts, and
//! data files a consuming site pulls in by URL at build time. The manifest
//! is declarative; fetching is the host's job.

use crate::site::{Error, Site};
use url::Url;

/// The base URL the theme's own files resolve against.
pub const THEME_BASE_URL: &str = "https://deno.land/x/lume_theme_simple_blog/";

/// Every file the theme ships, relative to the theme root.
pub const THEME_FILES: &[&str] = &[
    "_includes/css/fonts.css",
    "_includes/css/navbar.css",
    "_includes/css/page.css",
    "_includes/css/post-list.css",
    "_includes/css/post.css",
    "_includes/css/reset.css",
    "_includes/css/badge.css",
    "_includes/css/variables.css",
    "_includes/css/search.css",
    "_includes/layouts/archive_result.vto",
    "_includes/layouts/archive.vto",
    "_includes/layouts/base.vto",
    "_includes/layouts/page.vto",
    "_includes/layouts/post.vto",
    "_includes/templates/post-details.vto",
    "_includes/templates/post-list.vto",
    "fonts/inter.woff2",
    "fonts/inter-italic.woff2",
    "fonts/epilogue-bold.woff2",
    "posts/_data.yml",
    "_data.yml",
    "_data/i18n.yml",
    "404.md",
    "archive_result.tmpl.js",
    "archive.tmpl.js",
    "index.vto",
    "styles.css",
    "favicon.png",
];

/// Registers each theme file on `site`, resolved against `base` (the
/// theme's `src/` directory under its distribution root).
pub fn register(site: &mut Site, base: &Url) -> Result<(), Error> {
    for file in THEME_FILES {
        site.remote_file(file, base.join(&format!("src/{}", file))?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_manifest_paths_unique() {
        let paths: HashSet<&str> = THEME_FILES.iter().copied().collect();
        assert_eq!(THEME_FILES.len(), paths.len());
    }

    #[test]
    fn test_register_resolves_against_base() -> Result<(), Box<dyn std::error::Error>> {
        let mut site = Site::default();
        register(&mut site, &Url::parse(THEME_BASE_URL)?)?;
        assert_eq!(THEME_FILES.len(), site.remote_files().len());

        let fonts = site
            .remote_files()
            .iter()
            .find(|f| f.path == "fonts/inter.woff2")
            .unwrap();
        assert_eq!(
            "https://deno.land/x/lume_theme_simple_blog/src/fonts/inter.woff2",
            fonts.source.as_str(),
        );
        Ok(())
    }
}
