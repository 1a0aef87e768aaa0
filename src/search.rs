//! A small queryable index over the loaded page set. The archive generator
//! uses it to enumerate the distinct tags across the corpus, and the
//! rendering stage uses it to resolve an archive page's `search_query` back
//! into the posts it selects.

use crate::page::Page;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub struct Search<'a> {
    pages: &'a [Page],
}

impl<'a> Search<'a> {
    pub fn new(pages: &'a [Page]) -> Search<'a> {
        Search { pages }
    }

    /// Enumerates the distinct values a named multi-value attribute takes
    /// across the corpus, in first-seen order. Pages load in sorted path
    /// order, so re-running over an unchanged corpus enumerates identically.
    pub fn values(&self, attr: &str) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for page in self.pages {
            for value in page.attr_values(attr) {
                if seen.insert(value) {
                    values.push(value);
                }
            }
        }
        values
    }

    /// Returns the pages matching `query`, newest first (undated pages
    /// last, by id).
    pub fn pages(&self, query: &str) -> Result<Vec<&'a Page>, Error> {
        let query: Query = query.parse()?;
        let mut matches: Vec<&Page> = self
            .pages
            .iter()
            .filter(|page| query.matches(page))
            .collect();
        matches.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(matches)
    }
}

/// A conjunctive page filter: whitespace-separated `key=value` terms plus
/// quoted or bare tag terms. This is the same little language archive page
/// `search_query` strings are written in (`type=post 'some tag'`).
pub struct Query {
    terms: Vec<Term>,
}

enum Term {
    Attr(String, String),
    Tag(String),
}

impl FromStr for Query {
    type Err = Error;

    fn from_str(s: &str) -> Result<Query, Error> {
        let mut terms = Vec::new();
        let mut rest = s.trim();
        while !rest.is_empty() {
            if let Some(quoted) = rest.strip_prefix('\'') {
                match quoted.find('\'') {
                    None => return Err(Error::UnterminatedQuote(s.to_owned())),
                    Some(end) => {
                        terms.push(Term::Tag(quoted[..end].to_owned()));
                        rest = quoted[end + 1..].trim_start();
                    }
                }
            } else {
                let term = match rest.find(char::is_whitespace) {
                    Some(i) => {
                        let term = &rest[..i];
                        rest = rest[i..].trim_start();
                        term
                    }
                    None => {
                        let term = rest;
                        rest = "";
                        term
                    }
                };
                match term.split_once('=') {
                    Some((key, value)) => {
                        terms.push(Term::Attr(key.to_owned(), value.to_owned()))
                    }
                    None => terms.push(Term::Tag(term.to_owned())),
                }
            }
        }
        Ok(Query { terms })
    }
}

impl Query {
    fn matches(&self, page: &Page) -> bool {
        self.terms.iter().all(|term| match term {
            Term::Attr(key, value) => page.attr_values(key).contains(&value.as_str()),
            Term::Tag(tag) => page.tags.iter().any(|t| t == tag),
        })
    }
}

/// Represents a malformed query string.
#[derive(Debug)]
pub enum Error {
    /// Returned when a quoted term never closes.
    UnterminatedQuote(String),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnterminatedQuote(query) => {
                write!(f, "Unterminated quote in query \"{}\"", query)
            }
        }
    }
}

impl std::error::Error for Error {}
