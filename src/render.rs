//! Request building, response decoding, and HTML assembly for the diagram
//! rendering service.
//!
//! The network transport itself lives behind [`DiagramsService`]; this module
//! only shapes the outbound form body, decodes the JSON reply, and assembles
//! the final `<img>`/`<map>` HTML — including the inline error element shown
//! when the service is unreachable or reports a failure.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use quick_xml::escape::partial_escape;
use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::html;
use crate::imagemap::ImageMap;
use crate::title::SiteConfig;

/// A diagram description language the service can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    GraphViz,
    Mscgen,
    PlantUml,
}

impl Generator {
    /// The wiki tag name registered for this generator.
    pub fn from_tag(tag: &str) -> Option<Generator> {
        match tag {
            "graphviz" => Some(Generator::GraphViz),
            "mscgen" => Some(Generator::Mscgen),
            "uml" => Some(Generator::PlantUml),
            _ => None,
        }
    }

    /// The generator name as the service expects it.
    pub fn name(&self) -> &'static str {
        match self {
            Generator::GraphViz => "graphviz",
            Generator::Mscgen => "mscgen",
            Generator::PlantUml => "plantuml",
        }
    }

    /// Which image map format to request alongside the PNG, if any.
    pub fn map_format(&self) -> Option<MapFormat> {
        match self {
            Generator::GraphViz => Some(MapFormat::Cmapx),
            Generator::Mscgen => Some(MapFormat::Ismap),
            Generator::PlantUml => None,
        }
    }
}

/// Image map flavors produced by the rendering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFormat {
    /// Client-side `<map>`/`<area>` markup, rewritten by [`ImageMap`].
    Cmapx,
    /// Server-side map: clicks go to a URL as appended coordinates.
    Ismap,
}

impl MapFormat {
    pub fn name(&self) -> &'static str {
        match self {
            MapFormat::Cmapx => "cmapx",
            MapFormat::Ismap => "ismap",
        }
    }
}

/// One render call to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub generator: Generator,
    pub types: Vec<&'static str>,
    pub source: String,
}

impl RenderRequest {
    pub fn new(generator: Generator, source: impl Into<String>) -> Self {
        let mut types = vec!["png"];
        if let Some(format) = generator.map_format() {
            types.push(format.name());
        }
        RenderRequest {
            generator,
            types,
            source: source.into(),
        }
    }

    /// The `application/x-www-form-urlencoded` POST body:
    /// `generator=...&types[0]=png&types[1]=cmapx&source=...`.
    pub fn to_form_data(&self) -> String {
        let mut pairs: Vec<(String, &str)> = vec![("generator".to_string(), self.generator.name())];
        for (i, ty) in self.types.iter().enumerate() {
            pairs.push((format!("types[{i}]"), ty));
        }
        pairs.push(("source".to_string(), &self.source));

        let mut body = String::new();
        for (key, value) in &pairs {
            if !body.is_empty() {
                body.push('&');
            }
            body.push_str(&form_urlencode(key));
            body.push('=');
            body.push_str(&form_urlencode(value));
        }
        body
    }
}

/// Form encoding keeps `-_.` literal and turns spaces into `+`.
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b' ');

fn form_urlencode(value: &str) -> String {
    utf8_percent_encode(value, FORM_ENCODE_SET)
        .to_string()
        .replace(' ', "+")
}

/// Decoded JSON reply from the rendering service.
#[derive(Debug, Deserialize)]
pub struct RenderResponse {
    pub error: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub diagrams: Option<DiagramSet>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiagramSet {
    pub png: Option<DiagramFile>,
    pub cmapx: Option<DiagramFile>,
    pub ismap: Option<DiagramFile>,
}

#[derive(Debug, Deserialize)]
pub struct DiagramFile {
    pub url: Option<String>,
    pub contents: Option<String>,
}

/// Decode a raw response body, surfacing a service-reported error code as
/// [`Error::Backend`].
pub fn parse_response(body: &[u8]) -> Result<RenderResponse> {
    let response: RenderResponse =
        serde_json::from_slice(body).map_err(|e| Error::InvalidResponse(e.to_string()))?;
    match response {
        RenderResponse {
            error: Some(code),
            message,
            ..
        } => Err(Error::Backend { code, message }),
        response => Ok(response),
    }
}

/// The network boundary to the rendering service.
///
/// Implementations POST the form body to the service's `/render` endpoint
/// and return the raw response body. The service is untrusted and may hang:
/// implementations must enforce a request-level timeout and map transport
/// failures to [`Error::NoResponse`].
pub trait DiagramsService {
    fn post_render(&self, form_body: &str) -> Result<Vec<u8>>;
}

/// Renders diagram sources to embeddable HTML through a [`DiagramsService`].
#[derive(Debug)]
pub struct Renderer<S> {
    service: S,
    site: SiteConfig,
}

impl<S: DiagramsService> Renderer<S> {
    pub fn new(service: S, site: SiteConfig) -> Self {
        Renderer { service, site }
    }

    /// Render for a wiki tag name (`graphviz`, `mscgen`, `uml`).
    /// Returns `None` for unrecognized tags.
    pub fn render_tag(&self, tag: &str, source: &str) -> Option<String> {
        Generator::from_tag(tag).map(|generator| self.render(generator, source))
    }

    /// Render a diagram source to its final HTML.
    ///
    /// Failures never escape as errors: transport problems, undecodable
    /// responses, service-reported errors, and malformed image maps all come
    /// back as an inline `<span class="ext-diagrams error">` element.
    pub fn render(&self, generator: Generator, source: &str) -> String {
        let source = source.trim();
        if source.is_empty() {
            return String::new();
        }

        let request = RenderRequest::new(generator, source);
        let body = match self.service.post_render(&request.to_form_data()) {
            Ok(body) => body,
            Err(e) => {
                warn!(generator = generator.name(), error = %e, "diagram render request failed");
                return error_html(&e);
            }
        };
        match parse_response(&body) {
            Ok(response) => self.assemble(response),
            Err(e) => {
                warn!(generator = generator.name(), error = %e, "diagram service returned an error");
                error_html(&e)
            }
        }
    }

    fn assemble(&self, response: RenderResponse) -> String {
        let diagrams = response.diagrams.unwrap_or_default();
        let png_url = match diagrams.png.as_ref().and_then(|d| d.url.as_deref()) {
            Some(url) => url,
            None => {
                return error_html(&Error::InvalidResponse(
                    "response carries no png url".to_string(),
                ));
            }
        };

        let body = if let Some(contents) = diagrams.cmapx.as_ref().and_then(|d| d.contents.as_deref())
        {
            let map = ImageMap::new(contents, self.site.clone());
            match cmapx_html(png_url, &map) {
                Ok(html) => html,
                Err(e) => return error_html(&e),
            }
        } else if let Some(url) = diagrams.ismap.as_ref().and_then(|d| d.url.as_deref()) {
            let img = html::empty_element("img", &[("src", png_url), ("ismap", "")]);
            html::raw_element("a", &[("href", url)], &img)
        } else {
            html::empty_element("img", &[("src", png_url)])
        };
        html::raw_element("div", &[("class", "ext-diagrams")], &body)
    }
}

/// `<img usemap="#...">` plus the rewritten map, or a plain image when the
/// map has no clickable regions.
fn cmapx_html(png_url: &str, map: &ImageMap) -> Result<String> {
    if map.has_areas()? {
        let usemap = format!("#{}", map.name()?);
        let img = html::empty_element("img", &[("src", png_url), ("usemap", &usemap)]);
        Ok(format!("{img}{}", map.map_html()?))
    } else {
        Ok(html::empty_element("img", &[("src", png_url)]))
    }
}

/// The inline element shown in place of a diagram that failed to render.
fn error_html(error: &Error) -> String {
    let text = error.to_string();
    let mut inner = partial_escape(text.as_str()).into_owned();
    if let Error::Backend {
        message: Some(message),
        ..
    } = error
    {
        inner.push_str("<br/>");
        inner.push_str(&partial_escape(message.as_str()));
    }
    html::raw_element("span", &[("class", "ext-diagrams error")], &inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_from_tag() {
        assert_eq!(Generator::from_tag("graphviz"), Some(Generator::GraphViz));
        assert_eq!(Generator::from_tag("mscgen"), Some(Generator::Mscgen));
        assert_eq!(Generator::from_tag("uml"), Some(Generator::PlantUml));
        assert_eq!(Generator::from_tag("plantuml"), None);
        assert_eq!(Generator::from_tag(""), None);
    }

    #[test]
    fn test_request_types_follow_generator() {
        assert_eq!(
            RenderRequest::new(Generator::GraphViz, "digraph {}").types,
            vec!["png", "cmapx"]
        );
        assert_eq!(
            RenderRequest::new(Generator::Mscgen, "msc {}").types,
            vec!["png", "ismap"]
        );
        assert_eq!(
            RenderRequest::new(Generator::PlantUml, "@startuml").types,
            vec!["png"]
        );
    }

    #[test]
    fn test_form_data_encoding() {
        let request = RenderRequest::new(Generator::GraphViz, "digraph G { a -> b; }");
        assert_eq!(
            request.to_form_data(),
            "generator=graphviz&types%5B0%5D=png&types%5B1%5D=cmapx\
             &source=digraph+G+%7B+a+-%3E+b%3B+%7D"
        );
    }

    #[test]
    fn test_parse_response_success() {
        let body = br#"{"diagrams":{"png":{"url":"http://example.org/a.png"}}}"#;
        let response = parse_response(body).unwrap();
        let png = response.diagrams.unwrap().png.unwrap();
        assert_eq!(png.url.as_deref(), Some("http://example.org/a.png"));
    }

    #[test]
    fn test_parse_response_backend_error() {
        let body = br#"{"error":"bad-generator","message":"unknown generator"}"#;
        let err = parse_response(body).unwrap_err();
        assert_eq!(
            err,
            Error::Backend {
                code: "bad-generator".to_string(),
                message: Some("unknown generator".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_response_invalid_json() {
        assert!(matches!(
            parse_response(b"not json"),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_error_html_escapes_and_appends_message() {
        let html = error_html(&Error::Backend {
            code: "bad-source".to_string(),
            message: Some("line 3: <unexpected>".to_string()),
        });
        assert!(html.starts_with(r#"<span class="ext-diagrams error">"#));
        assert!(html.contains("bad-source"));
        assert!(html.contains("<br/>line 3: &lt;unexpected&gt;"));
    }
}
