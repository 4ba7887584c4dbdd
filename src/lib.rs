//! # diagrams
//!
//! Render textual diagram descriptions (GraphViz, Mscgen, PlantUML) embedded
//! in wiki pages into images with clickable, linked regions.
//!
//! Rendering itself happens in an external service reached through the
//! [`DiagramsService`] trait; this crate shapes the request, decodes the
//! reply, and — the interesting part — rewrites the returned client-side
//! image map so it can be embedded safely: ids are namespaced per diagram,
//! and `href` attributes carrying the wiki link mini-syntax
//! (`[[Page|label]]`, `[url]`) are resolved to real URLs.
//!
//! ## Quick start
//!
//! ```
//! use diagrams::{ImageMap, SiteConfig};
//!
//! let cmapx = r#"<map id="G" name="G">
//! <area shape="poly" coords="5,5,100,40" href="[[Main Page|start here]]"/>
//! </map>"#;
//!
//! let map = ImageMap::new(cmapx, SiteConfig::default());
//! assert!(map.has_areas()?);
//! assert_eq!(map.name()?, "ext-diagrams-G");
//! assert!(map.map_html()?.contains(r#"href="/wiki/Main_Page""#));
//! # Ok::<(), diagrams::Error>(())
//! ```
//!
//! A full render flow goes through [`Renderer`], which turns a diagram
//! source into final HTML (or an inline error element) using any
//! [`DiagramsService`] implementation as the transport.

pub mod error;
pub mod html;
pub mod imagemap;
pub mod links;
pub mod render;
pub mod title;
pub mod xml;

pub use error::{Error, Result};
pub use imagemap::ImageMap;
pub use links::LinkToken;
pub use render::{
    DiagramsService, Generator, MapFormat, RenderRequest, RenderResponse, Renderer,
};
pub use title::{SiteConfig, Title};
