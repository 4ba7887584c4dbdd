//! Wiki page titles and the site configuration that turns them into URLs.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left literal when a title is embedded in an article path.
///
/// Mirrors the conservative URL-safe set wikis traditionally use: standard
/// unreserved characters plus `;:@$!*(),/~` stay readable in page URLs.
const TITLE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b';')
    .remove(b':')
    .remove(b'@')
    .remove(b'$')
    .remove(b'!')
    .remove(b'*')
    .remove(b'(')
    .remove(b')')
    .remove(b',')
    .remove(b'/');

/// A validated, canonicalized wiki page title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    text: String,
}

impl Title {
    /// Parse user-supplied text into a canonical title.
    ///
    /// Returns `None` when the text cannot name a page: empty after trimming,
    /// contains characters that are illegal in titles, or is a relative-path
    /// segment. Underscores are treated as spaces, whitespace runs collapse,
    /// and the first letter is uppercased.
    pub fn from_text(text: &str) -> Option<Title> {
        let mut cleaned = String::with_capacity(text.len());
        let mut last_was_space = true; // also swallows leading whitespace
        for c in text.chars() {
            let c = if c == '_' { ' ' } else { c };
            if c.is_control() || matches!(c, '<' | '>' | '[' | ']' | '{' | '}' | '|' | '#') {
                return None;
            }
            if c == ' ' {
                if last_was_space {
                    continue;
                }
                last_was_space = true;
            } else {
                last_was_space = false;
            }
            cleaned.push(c);
        }
        let cleaned = cleaned.trim_end();
        if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
            return None;
        }
        if cleaned.starts_with("./") || cleaned.starts_with("../") {
            return None;
        }

        let mut chars = cleaned.chars();
        let first = chars.next()?;
        let mut canonical = String::with_capacity(cleaned.len());
        canonical.extend(first.to_uppercase());
        canonical.push_str(chars.as_str());
        Some(Title { text: canonical })
    }

    /// The human-readable form, with spaces.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The URL/database form, with underscores for spaces.
    pub fn db_key(&self) -> String {
        self.text.replace(' ', "_")
    }
}

/// Site-level settings needed to build page URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Article path pattern; `$1` is replaced by the encoded title.
    pub article_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            article_path: "/wiki/$1".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn new(article_path: impl Into<String>) -> Self {
        SiteConfig {
            article_path: article_path.into(),
        }
    }

    /// The canonical relative URL for a page.
    pub fn link_url(&self, title: &Title) -> String {
        let encoded = utf8_percent_encode(&title.db_key(), TITLE_ENCODE_SET).to_string();
        self.article_path.replace("$1", &encoded)
    }
}
