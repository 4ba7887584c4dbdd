//! Client-side image map rewriting.
//!
//! The rendering backend returns cmapx markup whose element ids are only
//! unique per diagram and whose `href` attributes still carry the bracketed
//! link mini-syntax. [`ImageMap`] rewrites such a document so it can be
//! embedded on a page: the root id is namespaced, `name` is set for
//! `<img usemap="#...">` binding, and every href is resolved to a real URL.

use std::sync::OnceLock;

use tracing::debug;

use crate::error::Result;
use crate::links;
use crate::title::SiteConfig;
use crate::xml::{self, Element};

/// Prefix applied to the backend's raw map id, so several diagrams on one
/// page cannot collide.
const ID_PREFIX: &str = "ext-diagrams-";

#[derive(Debug)]
struct MapDocument {
    root: Element,
    name: String,
}

/// One client-side image map, parsed and rewritten on first access.
///
/// The raw markup is immutable; parsing and rewriting happen at most once,
/// lazily, and every accessor observes the identical outcome — including a
/// [`MalformedMarkup`](crate::Error::MalformedMarkup) failure, which is
/// memoized the same way a successful rewrite is.
#[derive(Debug)]
pub struct ImageMap {
    raw: String,
    site: SiteConfig,
    document: OnceLock<Result<MapDocument>>,
}

impl ImageMap {
    pub fn new(markup: impl Into<String>, site: SiteConfig) -> Self {
        ImageMap {
            raw: markup.into(),
            site,
            document: OnceLock::new(),
        }
    }

    /// Whether the map contains any `<area>` elements. A map with none is
    /// pointless and callers suppress it entirely.
    pub fn has_areas(&self) -> Result<bool> {
        Ok(self.document()?.root.count_elements("area") > 0)
    }

    /// The namespaced map name, referenced by the image element as
    /// `usemap="#<name>"`.
    pub fn name(&self) -> Result<&str> {
        Ok(self.document()?.name.as_str())
    }

    /// The rewritten map markup, serialized from the root element.
    /// Byte-identical across calls on the same instance.
    pub fn map_html(&self) -> Result<String> {
        Ok(self.document()?.root.serialize())
    }

    fn document(&self) -> Result<&MapDocument> {
        self.document
            .get_or_init(|| self.build())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn build(&self) -> Result<MapDocument> {
        let mut root = xml::parse(&self.raw)?;

        // Namespace the id; the raw id may be absent entirely.
        let raw_id = root.attribute("id").unwrap_or_default();
        let name = format!("{ID_PREFIX}{raw_id}");
        root.set_attribute("id", &name);
        root.set_attribute("name", &name);

        // Resolve link tokens on every element carrying an href.
        let site = &self.site;
        let mut rewritten = 0usize;
        root.for_each_element_mut(&mut |el| {
            if let Some(href) = el.attribute("href") {
                let resolved = links::resolve_href(href, site);
                el.set_attribute("href", &resolved);
                rewritten += 1;
            }
        });

        debug!(name = %name, rewritten, "rewrote image map");
        Ok(MapDocument { root, name })
    }
}
