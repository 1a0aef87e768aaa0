//! A simple blog theme for a static-site build pipeline. The theme ships no
//! heavy machinery of its own; applying it to a [`site::Site`] contributes
//! three things:
//!
//! 1. An ordered chain of plugin registrations ([`crate::plugins`]) — CSS
//!    processing, search indexing, feeds, math, and highlighting stay
//!    declarative for the host framework, while the steps the theme owns
//!    (post dates, slugified URLs, excerpt folding, tag archives) are wired
//!    as real callbacks.
//! 2. A manifest of remote theme assets ([`crate::remote`]): layouts,
//!    stylesheets, fonts, and data files resolved by URL.
//! 3. The two pieces of original behavior: the excerpt preprocessor
//!    ([`crate::excerpt`]) and the tag-archive page generator
//!    ([`crate::archive`]).
//!
//! The supporting host model loads pages ([`crate::page`]), indexes them
//! ([`crate::search`]), runs the configured steps ([`crate::site`]), and
//! renders the result through externally supplied layouts ([`crate::write`]).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod archive;
pub mod config;
pub mod excerpt;
pub mod i18n;
pub mod page;
pub mod plugins;
pub mod remote;
pub mod search;
pub mod site;
pub mod value;
pub mod write;

use config::Options;
use site::{Error, Site};
use url::Url;

/// Configures `site` with the theme: applies the plugin chain in its fixed
/// order, then registers the theme's remote files against
/// [`remote::THEME_BASE_URL`].
pub fn configure(site: &mut Site, options: &Options) -> Result<(), Error> {
    plugins::install(site, options)?;
    let base = Url::parse(remote::THEME_BASE_URL)?;
    remote::register(site, &base)?;
    Ok(())
}
