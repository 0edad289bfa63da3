use super::*;

const PLAN: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:cvjs="urn:cvjs">
  <path cvjs:layername="RM_WALL" visibility="inherit"/>
  <path cvjs:layername="RM_WALL"/>
  <path cvjs:layername="RM_DOOR"/>
</svg>"#;

fn index(doc: &SvgDocument) -> VisibilityIndex {
    VisibilityIndex::build(doc, &LayerSelector::Attribute("cvjs:layername".into()), "visibility", "hidden")
}

// --- SurfaceKind ---

#[test]
fn surface_kind_parses_aliases() {
    assert_eq!("live".parse::<SurfaceKind>(), Ok(SurfaceKind::Live));
    assert_eq!(" SVG ".parse::<SurfaceKind>(), Ok(SurfaceKind::Live));
    assert_eq!("canvas".parse::<SurfaceKind>(), Ok(SurfaceKind::Raster));
    assert!("webgl".parse::<SurfaceKind>().is_err());
}

#[test]
fn surface_kind_display_round_trips() {
    for kind in [SurfaceKind::Live, SurfaceKind::Raster] {
        assert_eq!(kind.to_string().parse::<SurfaceKind>(), Ok(kind));
    }
}

#[test]
fn profiles_differ_per_kind() {
    assert_eq!(SurfaceKind::Live.profile(), ZoomProfile::LIVE);
    assert_eq!(SurfaceKind::Raster.profile(), ZoomProfile::RASTER);
    assert_eq!(SurfaceKind::default(), SurfaceKind::Live);
}

#[test]
fn render_context_defaults_to_base_floor() {
    assert!((RenderContext::default().min_line_width - DEFAULT_MIN_LINE_WIDTH).abs() < f64::EPSILON);
}

// --- VisibilityIndex ---

#[test]
fn hide_marks_every_member() {
    let mut doc = SvgDocument::parse(PLAN).expect("parses");
    let idx = index(&doc);
    assert_eq!(idx.keys(), ["RM_WALL".to_owned(), "RM_DOOR".to_owned()]);
    assert!(idx.apply(&mut doc, "RM_WALL", false));
    assert_eq!(idx.hidden_count(&doc, "RM_WALL"), 2);
    assert_eq!(idx.hidden_count(&doc, "RM_DOOR"), 0);
}

#[test]
fn show_restores_original_values() {
    let mut doc = SvgDocument::parse(PLAN).expect("parses");
    let idx = index(&doc);
    let before = doc.to_markup();
    idx.apply(&mut doc, "RM_WALL", false);
    idx.apply(&mut doc, "RM_WALL", true);
    assert_eq!(doc.to_markup(), before);
}

#[test]
fn showing_twice_is_idempotent() {
    let mut doc = SvgDocument::parse(PLAN).expect("parses");
    let idx = index(&doc);
    let before = doc.to_markup();
    idx.apply(&mut doc, "RM_DOOR", true);
    idx.apply(&mut doc, "RM_DOOR", true);
    assert_eq!(doc.to_markup(), before);
}

#[test]
fn unknown_key_is_rejected() {
    let mut doc = SvgDocument::parse(PLAN).expect("parses");
    let idx = index(&doc);
    assert!(!idx.apply(&mut doc, "NOPE", false));
}
