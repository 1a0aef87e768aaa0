//! The excerpt preprocessor: derives a page's summary by folding its
//! rendered body at the `<!-- more -->` marker.

use crate::page::Page;
use regex::Regex;
use std::sync::OnceLock;

/// Matches an HTML comment containing only the word `more`, case-insensitive
/// and tolerant of whitespace inside the delimiters.
fn more_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"(?i)<!--\s*more\s*-->").unwrap())
}

/// Sets `page.excerpt` to the prefix of the rendered body preceding the
/// first `more` marker. An excerpt that is already set (e.g., authored in
/// frontmatter) is left alone, and a body without a marker becomes its own
/// excerpt in full.
pub fn apply(page: &mut Page) {
    if page.excerpt.is_some() {
        return;
    }
    page.excerpt = Some(match more_marker().find(&page.content) {
        Some(m) => page.content[..m.start()].to_owned(),
        None => page.content.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn page(content: &str, excerpt: Option<&str>) -> Page {
        Page {
            id: "posts/test".to_owned(),
            url: "/posts/test/".to_owned(),
            title: "Test".to_owned(),
            kind: "post".to_owned(),
            date: None,
            tags: Vec::new(),
            extension: ".md".to_owned(),
            content: content.to_owned(),
            excerpt: excerpt.map(str::to_owned),
            extra: BTreeMap::new(),
        }
    }

    fn fixture(content: &str, wanted: &str) {
        let mut page = page(content, None);
        apply(&mut page);
        assert_eq!(Some(wanted.to_owned()), page.excerpt);
    }

    #[test]
    fn test_folds_at_marker() {
        fixture("A<!-- more -->B", "A");
    }

    #[test]
    fn test_no_marker_keeps_full_content() {
        fixture("AB", "AB");
    }

    #[test]
    fn test_marker_case_insensitive() {
        fixture("A<!--MORE-->B", "A");
        fixture("A<!-- More -->B", "A");
    }

    #[test]
    fn test_marker_internal_whitespace() {
        fixture("A<!--   more\t-->B", "A");
    }

    #[test]
    fn test_first_marker_wins() {
        fixture("A<!-- more -->B<!-- more -->C", "A");
    }

    #[test]
    fn test_preset_excerpt_untouched() {
        let mut page = page("A<!-- more -->B", Some("X"));
        apply(&mut page);
        assert_eq!(Some("X".to_owned()), page.excerpt);
    }

    #[test]
    fn test_reapplying_is_stable() {
        let mut page = page("A<!-- more -->B", None);
        apply(&mut page);
        apply(&mut page);
        assert_eq!(Some("A".to_owned()), page.excerpt);
    }
}
