//! The bracketed link mini-syntax used inside image map `href` attributes.
//!
//! Diagram sources address wiki pages and external sites with a compact
//! token syntax, carried through the rendering backend verbatim:
//!
//! - `[[Page Name]]` / `[[Page Name|Label]]` — internal wiki page
//! - `[https://example.org]` / `[https://example.org|Label]` — external URL
//!
//! Labels are display-only in the diagram source and never contribute to the
//! resolved href. Values matching neither form (typically already-resolved
//! URLs) pass through unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::title::{SiteConfig, Title};

/// One `[` or `[[`, a target (no `]` or `|`), an optional `|label`, then one
/// or two `]`. Mismatched bracket counts (`[[x]`, `[x]]`) still scan; the
/// opener decides internal vs external.
static LINK_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\[)?([^\]|]+)(?:\|([^\]]*))?\]?\]").unwrap());

/// A scanned link token, borrowed from the href value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkToken<'a> {
    /// `[[Target]]` — a wiki page name.
    Internal {
        target: &'a str,
        label: Option<&'a str>,
    },
    /// `[Target]` — a literal URL.
    External {
        target: &'a str,
        label: Option<&'a str>,
    },
}

/// Scan a value for the first link token, if any.
pub fn parse_link_token(value: &str) -> Option<LinkToken<'_>> {
    LINK_TOKEN.captures(value).map(|caps| token(&caps))
}

fn token<'t>(caps: &Captures<'t>) -> LinkToken<'t> {
    let target = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let label = caps.get(3).map(|m| m.as_str());
    if caps.get(1).is_some() {
        LinkToken::Internal { target, label }
    } else {
        LinkToken::External { target, label }
    }
}

/// Rewrite every link token in an href value to a literal URL.
///
/// Each matched span is replaced as a whole. Internal targets resolve through
/// [`Title::from_text`] and the site's article path; a target that is not a
/// valid title leaves its token in place as an inert literal. External
/// targets are used verbatim, brackets and label stripped.
pub fn resolve_href(value: &str, site: &SiteConfig) -> String {
    LINK_TOKEN
        .replace_all(value, |caps: &Captures| match token(caps) {
            LinkToken::Internal { target, .. } => match Title::from_text(target) {
                Some(title) => site.link_url(&title),
                None => {
                    debug!(page = target, "link target is not a valid title, leaving token as-is");
                    caps[0].to_string()
                }
            },
            LinkToken::External { target, .. } => target.to_string(),
        })
        .into_owned()
}
