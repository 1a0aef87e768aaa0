//! The tag-archive page generator: expands the set of distinct tags across
//! the corpus into one virtual archive page descriptor per tag. The
//! descriptors are created fresh each build and handed straight to the
//! rendering stage; nothing here persists or mutates shared state.

use crate::i18n::{self, I18n};
use crate::search::Search;

/// The `type` attribute shared by all generated archive pages.
pub const ARCHIVE_KIND: &str = "tag";

/// The i18n key for the archive page title label.
pub const TITLE_KEY: &str = "search.by_tag";

/// A virtual page for one tag's archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchivePage {
    /// The routable path for the archive, always `/tag/<tag>/`.
    pub url: String,

    /// The localized title label, passed through uninstantiated. The
    /// rendering stage substitutes the tag into its placeholder.
    pub title: String,

    /// The page `type` attribute; always [`ARCHIVE_KIND`].
    pub kind: String,

    /// The query selecting the archive's posts. Re-derivable from `tag`
    /// alone via [`search_query`].
    pub search_query: String,

    /// The tag this archive aggregates.
    pub tag: String,
}

/// Derives the query selecting the posts for `tag`. A tag value containing
/// a single quote yields a malformed query; tags are expected to be
/// sanitized upstream (see the `slugify_urls` pipeline step), so the
/// embedded quote is not escaped here.
pub fn search_query(tag: &str) -> String {
    format!("type=post '{}'", tag)
}

/// Produces one [`ArchivePage`] per distinct tag observed by `search`, in
/// the index's own enumeration order. Zero tags yields an empty set, which
/// is a valid build. Re-invoking over the same inputs yields an identical
/// descriptor set.
pub fn archive_pages(search: &Search, i18n: &I18n) -> Result<Vec<ArchivePage>, i18n::Error> {
    let title = i18n.get(TITLE_KEY)?;
    Ok(search
        .values("tags")
        .into_iter()
        .map(|tag| ArchivePage {
            url: format!("/tag/{}/", tag),
            title: title.to_owned(),
            kind: ARCHIVE_KIND.to_owned(),
            search_query: search_query(tag),
            tag: tag.to_owned(),
        })
        .collect())
}
