//! Minimal XML fragment parsing and serialization.
//!
//! The rendering backend returns image maps as small XML fragments
//! (`<map><area .../></map>`). This module parses such a fragment into an
//! owned, mutable element tree and serializes it back deterministically.
//!
//! Security: the parser never resolves entities. General entity references
//! are kept as [`Node::EntityRef`] and round-trip unexpanded, and DOCTYPE
//! declarations (the only place external entities could be declared) are
//! rejected as malformed. There is no entity loader to disable.

use quick_xml::Reader;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    /// An unresolved general entity reference (`&name;`), stored by name.
    EntityRef(String),
}

/// An XML element with its attributes and children, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Get an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place or appending.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Count elements with the given tag name in this subtree (including self).
    pub fn count_elements(&self, name: &str) -> usize {
        let mut count = usize::from(self.name == name);
        for child in &self.children {
            if let Node::Element(el) = child {
                count += el.count_elements(name);
            }
        }
        count
    }

    /// Visit every element in this subtree mutably, in document order.
    pub fn for_each_element_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.for_each_element_mut(f);
            }
        }
    }

    /// Serialize this element and its subtree to a markup string.
    ///
    /// Output is non-pretty (no added whitespace) and deterministic: the same
    /// tree always serializes to the same bytes. Childless elements
    /// self-close.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(el) => el.write(out),
                Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
                Node::CData(text) => {
                    out.push_str("<![CDATA[");
                    out.push_str(text);
                    out.push_str("]]>");
                }
                Node::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                Node::EntityRef(name) => {
                    out.push('&');
                    out.push_str(name);
                    out.push(';');
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// Parse a markup string into its single root element.
///
/// Fails with [`Error::MalformedMarkup`] on syntax errors, mismatched or
/// unclosed tags, missing or multiple root elements, content outside the
/// root, and DOCTYPE declarations.
pub fn parse(markup: &str) -> Result<Element> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().check_end_names = true;

    let mut root: Option<Element> = None;
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(Error::MalformedMarkup("multiple root elements".to_string()));
                }
                stack.push(element_from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let el = element_from_start(&e)?;
                attach(&mut stack, &mut root, Node::Element(el))?;
            }
            Ok(Event::End(_)) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| Error::MalformedMarkup("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, Node::Element(el))?;
            }
            Ok(Event::Text(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                if stack.is_empty() {
                    if !text.trim().is_empty() {
                        return Err(Error::MalformedMarkup(
                            "content outside the root element".to_string(),
                        ));
                    }
                } else {
                    attach(&mut stack, &mut root, Node::Text(text))?;
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                attach(&mut stack, &mut root, Node::CData(text))?;
            }
            Ok(Event::Comment(e)) => {
                if !stack.is_empty() {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    attach(&mut stack, &mut root, Node::Comment(text))?;
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let name = String::from_utf8_lossy(e.as_ref()).into_owned();
                attach(&mut stack, &mut root, Node::EntityRef(name))?;
            }
            Ok(Event::DocType(_)) => {
                return Err(Error::MalformedMarkup(
                    "DOCTYPE declarations are not allowed".to_string(),
                ));
            }
            Ok(Event::Decl(_)) | Ok(Event::PI(_)) => {}
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::MalformedMarkup(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(Error::MalformedMarkup(format!(
            "unclosed element <{}>",
            stack.last().map(|el| el.name.as_str()).unwrap_or_default()
        )));
    }
    root.ok_or_else(|| Error::MalformedMarkup("no root element".to_string()))
}

fn element_from_start(e: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::MalformedMarkup(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| Error::MalformedMarkup(err.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Append a parsed node to the open element, or promote it to the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match node {
        Node::Element(el) => {
            if root.is_some() {
                return Err(Error::MalformedMarkup("multiple root elements".to_string()));
            }
            *root = Some(el);
            Ok(())
        }
        _ => Err(Error::MalformedMarkup(
            "content outside the root element".to_string(),
        )),
    }
}
