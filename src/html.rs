//! Small helpers for assembling escaped HTML elements.

use quick_xml::escape::{escape, partial_escape};

fn open_tag(out: &mut String, tag: &str, attrs: &[(&str, &str)]) {
    out.push('<');
    out.push_str(tag);
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(*value));
        out.push('"');
    }
}

/// A void element: `<img src="..."/>`.
pub fn empty_element(tag: &str, attrs: &[(&str, &str)]) -> String {
    let mut out = String::new();
    open_tag(&mut out, tag, attrs);
    out.push_str("/>");
    out
}

/// An element whose content is escaped text.
pub fn element(tag: &str, attrs: &[(&str, &str)], text: &str) -> String {
    raw_element(tag, attrs, &partial_escape(text))
}

/// An element whose content is already-built HTML, included verbatim.
pub fn raw_element(tag: &str, attrs: &[(&str, &str)], inner: &str) -> String {
    let mut out = String::new();
    open_tag(&mut out, tag, attrs);
    out.push('>');
    out.push_str(inner);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    out
}
