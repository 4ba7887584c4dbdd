//! End-to-end tests for image map rewriting.

use diagrams::{Error, ImageMap, SiteConfig};

fn map(markup: &str) -> ImageMap {
    ImageMap::new(markup, SiteConfig::default())
}

/// A realistic GraphViz cmapx payload: newline-separated areas, internal and
/// external link tokens, titles carried through.
const GRAPHVIZ_CMAPX: &str = "<map id=\"G\" name=\"G\">\n\
<area shape=\"poly\" coords=\"164,108,163,101,159,94,153,88\" href=\"[[Main Page|the main page]]\" title=\"the main page\"/>\n\
<area shape=\"rect\" coords=\"24,155,120,179\" href=\"[https://example.org/x]\" title=\"example\"/>\n\
</map>";

#[test]
fn test_identifier_is_namespaced_onto_id_and_name() {
    let map = map(GRAPHVIZ_CMAPX);
    assert_eq!(map.name().unwrap(), "ext-diagrams-G");
    let html = map.map_html().unwrap();
    assert!(html.starts_with("<map id=\"ext-diagrams-G\" name=\"ext-diagrams-G\">"));
}

#[test]
fn test_internal_link_resolves_and_label_is_ignored() {
    let with_label = map("<map id=\"G\"><area href=\"[[Main Page|Click here]]\"/></map>");
    let without_label = map("<map id=\"G\"><area href=\"[[Main Page]]\"/></map>");
    assert!(with_label.map_html().unwrap().contains("href=\"/wiki/Main_Page\""));
    assert_eq!(
        with_label.map_html().unwrap(),
        without_label.map_html().unwrap()
    );
}

#[test]
fn test_external_link_brackets_are_stripped() {
    let html = map("<map id=\"G\"><area href=\"[https://example.org/x]\"/></map>")
        .map_html()
        .unwrap();
    assert!(html.contains("href=\"https://example.org/x\""));
}

#[test]
fn test_literal_href_passes_through() {
    let html = map("<map id=\"G\"><area href=\"https://example.org/already-resolved\"/></map>")
        .map_html()
        .unwrap();
    assert!(html.contains("href=\"https://example.org/already-resolved\""));
}

#[test]
fn test_unresolvable_title_leaves_token_as_literal() {
    // `{` is illegal in page names, so the token stays verbatim.
    let html = map("<map id=\"G\"><area href=\"[[a{b}]]\"/></map>")
        .map_html()
        .unwrap();
    assert!(html.contains("href=\"[[a{b}]]\""));
}

#[test]
fn test_area_detection() {
    assert!(map(GRAPHVIZ_CMAPX).has_areas().unwrap());
    assert!(!map("<map id=\"G\" name=\"G\"/>").has_areas().unwrap());
    assert!(!map("<map id=\"G\"><!-- empty --></map>").has_areas().unwrap());
}

#[test]
fn test_malformed_markup_is_rejected() {
    let map = map("<map><area></map");
    assert!(matches!(map.has_areas(), Err(Error::MalformedMarkup(_))));
    assert!(matches!(map.map_html(), Err(Error::MalformedMarkup(_))));
}

#[test]
fn test_external_entities_are_never_resolved() {
    // A DOCTYPE with an external entity is rejected outright.
    let with_dtd = map(concat!(
        "<!DOCTYPE map [<!ENTITY leak SYSTEM \"file:///etc/passwd\">]>",
        "<map id=\"G\"><area href=\"x\" title=\"&leak;\"/></map>"
    ));
    assert!(matches!(with_dtd.map_html(), Err(Error::MalformedMarkup(_))));

    // A bare entity reference in content survives serialization unexpanded.
    let bare = map("<map id=\"G\"><area href=\"x\"/>&leak;</map>");
    assert!(bare.map_html().unwrap().contains("&leak;"));
}

#[test]
fn test_serialization_is_stable_across_accessor_order() {
    let forward = map(GRAPHVIZ_CMAPX);
    assert!(forward.has_areas().unwrap());
    assert_eq!(forward.name().unwrap(), "ext-diagrams-G");
    let first = forward.map_html().unwrap();
    assert_eq!(forward.map_html().unwrap(), first);

    // Different accessor order, same instance semantics.
    let reverse = map(GRAPHVIZ_CMAPX);
    let html = reverse.map_html().unwrap();
    assert_eq!(reverse.name().unwrap(), "ext-diagrams-G");
    assert!(reverse.has_areas().unwrap());
    assert_eq!(html, first);
}

#[test]
fn test_custom_article_path() {
    let site = SiteConfig::new("https://wiki.example.org/view/$1");
    let map = ImageMap::new("<map id=\"G\"><area href=\"[[Main Page]]\"/></map>", site);
    assert!(
        map.map_html()
            .unwrap()
            .contains("href=\"https://wiki.example.org/view/Main_Page\"")
    );
}
