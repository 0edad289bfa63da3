use super::*;

const PLAN: &str = r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:cvjs="urn:cvjs" viewBox="0 0 1000 800" width="100%">
  <defs><style>:root { --tmsMinLineWidth: 0.8; } path { stroke: #000; }</style></defs>
  <g id="RM_WALL">
    <path cvjs:layername="RM_WALL" d="M0 0 L10 10"/>
    <path cvjs:layername="RM_WALL" d="M5 5 L10 10" visibility="visible"/>
  </g>
  <g id="RM_DOOR">
    <path cvjs:layername="RM_DOOR" d="M1 1 L2 2"/>
  </g>
  <g><text>A &amp; B</text></g>
</svg>"#;

fn plan() -> SvgDocument {
    SvgDocument::parse(PLAN).expect("plan parses")
}

// =============================================================
// Parsing
// =============================================================

#[test]
fn parse_rejects_malformed_markup() {
    let err = SvgDocument::parse("<svg><g></svg>").expect_err("unbalanced");
    assert!(matches!(err, ParseError::Xml(_)));
}

#[test]
fn parse_rejects_non_svg_root() {
    let err = SvgDocument::parse("<html/>").expect_err("not svg");
    assert!(matches!(err, ParseError::NotSvg(ref name) if name == "html"));
}

#[test]
fn parse_accepts_doctype() {
    let text = r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd"><svg/>"#;
    assert!(SvgDocument::parse(text).is_ok());
}

#[test]
fn root_is_svg_element() {
    let doc = plan();
    let root = doc.element(doc.root()).expect("root element");
    assert_eq!(root.local, "svg");
    assert_eq!(root.name, "svg");
}

#[test]
fn namespaced_attributes_keep_prefix() {
    let doc = plan();
    let paths: Vec<_> = doc
        .elements()
        .into_iter()
        .filter(|&n| doc.attr(n, "cvjs:layername").is_some())
        .collect();
    assert_eq!(paths.len(), 3);
}

#[test]
fn namespace_declarations_stay_on_root() {
    let doc = plan();
    let root = doc.element(doc.root()).expect("root element");
    assert!(root.namespaces.contains(&(None, "http://www.w3.org/2000/svg".to_owned())));
    assert!(root.namespaces.contains(&(Some("cvjs".to_owned()), "urn:cvjs".to_owned())));
    for n in doc.descendants(doc.root()) {
        assert!(doc.element(n).expect("element").namespaces.is_empty());
    }
}

// =============================================================
// Queries
// =============================================================

#[test]
fn elements_are_in_document_order() {
    let doc = plan();
    let locals: Vec<_> = doc
        .elements()
        .into_iter()
        .map(|n| doc.element(n).expect("element").local.clone())
        .collect();
    assert_eq!(locals, ["svg", "defs", "style", "g", "path", "path", "g", "path", "g", "text"]);
}

#[test]
fn find_by_id_locates_group() {
    let doc = plan();
    let id = doc.find_by_id("RM_DOOR").expect("door group");
    assert_eq!(doc.element(id).expect("element").local, "g");
    assert!(doc.find_by_id("missing").is_none());
}

#[test]
fn text_content_decodes_entities() {
    let doc = plan();
    let text = doc
        .elements()
        .into_iter()
        .find(|&n| doc.element(n).is_some_and(|el| el.local == "text"))
        .expect("text element");
    assert_eq!(doc.text_content(text), "A & B");
}

#[test]
fn style_text_collects_stylesheets() {
    assert!(plan().style_text().contains("--tmsMinLineWidth: 0.8;"));
}

#[test]
fn intrinsic_size_prefers_view_box() {
    assert_eq!(plan().intrinsic_size(), Some((1000.0, 800.0)));
}

#[test]
fn intrinsic_size_falls_back_to_dimensions() {
    let doc = SvgDocument::parse(r#"<svg width="640px" height="480"/>"#).expect("parses");
    assert_eq!(doc.intrinsic_size(), Some((640.0, 480.0)));
}

#[test]
fn intrinsic_size_accepts_comma_view_box() {
    let doc = SvgDocument::parse(r#"<svg viewBox="0,0,20,10"/>"#).expect("parses");
    assert_eq!(doc.intrinsic_size(), Some((20.0, 10.0)));
}

#[test]
fn view_box_rect_keeps_origin() {
    let doc = SvgDocument::parse(r#"<svg viewBox="1000 -50 200 100"/>"#).expect("parses");
    assert_eq!(doc.view_box_rect(), Some((1000.0, -50.0, 200.0, 100.0)));
    let empty = SvgDocument::parse(r#"<svg viewBox="0 0 0 10" width="5" height="5"/>"#).expect("parses");
    assert_eq!(empty.view_box_rect(), None);
    assert_eq!(empty.intrinsic_size(), Some((5.0, 5.0)));
}

#[test]
fn intrinsic_size_absent_for_relative_dimensions() {
    let doc = SvgDocument::parse(r#"<svg width="100%" height="100%"/>"#).expect("parses");
    assert_eq!(doc.intrinsic_size(), None);
}

// =============================================================
// Mutation
// =============================================================

#[test]
fn set_attr_inserts_updates_and_removes() {
    let mut doc = plan();
    let g = doc.find_by_id("RM_WALL").expect("group");
    assert!(doc.set_attr(g, "display", Some("none")));
    assert_eq!(doc.attr(g, "display"), Some("none"));
    assert!(doc.set_attr(g, "display", Some("inline")));
    assert_eq!(doc.attr(g, "display"), Some("inline"));
    assert!(doc.set_attr(g, "display", None));
    assert_eq!(doc.attr(g, "display"), None);
}

// =============================================================
// Layer index
// =============================================================

#[test]
fn attribute_index_groups_by_value() {
    let doc = plan();
    let index = doc.layer_index(&LayerSelector::Attribute("cvjs:layername".into()));
    assert_eq!(index.keys(), ["RM_WALL", "RM_DOOR"]);
    assert_eq!(index.members("RM_WALL").len(), 2);
    assert_eq!(index.members("RM_DOOR").len(), 1);
    assert!(index.members("nope").is_empty());
}

#[test]
fn group_index_only_counts_groups_with_id() {
    let doc = plan();
    let index = doc.layer_index(&LayerSelector::GroupId);
    assert_eq!(index.keys(), ["RM_WALL", "RM_DOOR"]);
    assert!(index.contains("RM_DOOR"));
    assert!(!index.contains("svg"));
}

// =============================================================
// Serialization
// =============================================================

#[test]
fn markup_reparses_to_same_structure() {
    let doc = plan();
    let again = SvgDocument::parse(&doc.to_markup()).expect("serialized markup parses");
    assert_eq!(again.elements().len(), doc.elements().len());
    assert_eq!(again.to_markup(), doc.to_markup());
    let index = again.layer_index(&LayerSelector::Attribute("cvjs:layername".into()));
    assert_eq!(index.keys(), ["RM_WALL", "RM_DOOR"]);
}

#[test]
fn markup_escapes_text_and_attributes() {
    let mut doc = plan();
    let root = doc.root();
    doc.set_attr(root, "data-note", Some(r#"a "b" <c>"#));
    let markup = doc.to_markup();
    assert!(markup.contains(r#"data-note="a &quot;b&quot; &lt;c&gt;""#));
    assert!(markup.contains("A &amp; B"));
}

#[test]
fn style_filter_only_touches_stylesheets() {
    let markup = plan().to_markup_with(|css| css.replace("0.8", "0.2"));
    assert!(markup.contains("--tmsMinLineWidth: 0.2;"));
    assert!(markup.contains("A &amp; B"));
}
