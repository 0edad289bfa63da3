use super::*;

const PLAN: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:cvjs="urn:cvjs" viewBox="0 0 1000 800" width="1000" height="800">
  <defs><style>:root { --tmsMinLineWidth: 0.8; }</style></defs>
  <g id="cv_main_drawing" stroke-width="2">
    <path cvjs:layername="RM_WALL" d="M0 0 L10 10"/>
    <path cvjs:layername="RM_WALL" visibility="visible" d="M0 0 L20 20"/>
    <path cvjs:layername="RM_DOOR" d="M5 5 L6 6"/>
    <g cvjs:layername="RM_WALL"><path d="M1 1 L2 2"/></g>
  </g>
</svg>"#;

fn loaded() -> LiveSurface {
    let mut s = LiveSurface::new();
    s.load(PLAN).expect("plan loads");
    s
}

#[test]
fn empty_surface_outputs_nothing() {
    let s = LiveSurface::new();
    assert!(matches!(s.output(), SurfaceOutput::Empty));
    assert!(s.extract_layer_candidates().is_empty());
    assert!(s.world_size().is_none());
    assert_eq!(s.kind(), SurfaceKind::Live);
}

#[test]
fn load_indexes_layers_in_document_order() {
    let s = loaded();
    assert_eq!(s.extract_layer_candidates(), vec!["RM_WALL".to_owned(), "RM_DOOR".to_owned()]);
    assert_eq!(s.world_size(), Some((1000.0, 800.0)));
}

#[test]
fn load_zeroes_main_drawing_stroke() {
    let s = loaded();
    let doc = s.document().expect("loaded");
    let main = doc.find_by_id("cv_main_drawing").expect("main group");
    assert_eq!(doc.attr(main, "stroke-width"), Some("0"));
}

#[test]
fn malformed_load_keeps_previous_drawing() {
    let mut s = loaded();
    assert!(s.load("<svg><g></svg>").is_err());
    assert!(s.load("<html/>").is_err());
    assert_eq!(s.extract_layer_candidates().len(), 2);
}

#[test]
fn render_rewrites_container_transform_and_floor() {
    let mut s = loaded();
    assert_eq!(s.container_transform(), Some("translate(0,0) scale(1)"));
    let ctx = RenderContext { min_line_width: 0.3 };
    s.render(Transform::new(2.0, 50.0, -10.0), &ctx).expect("render");
    assert_eq!(s.container_transform(), Some("translate(50,-10) scale(2)"));
    let markup = s.markup().expect("markup");
    assert!(markup.contains(r#"transform="translate(50,-10) scale(2)""#));
    assert!(markup.contains("--tmsMinLineWidth: 0.3"));
    assert!(markup.contains(r#"viewBox="0 0 1000 800""#));
}

#[test]
fn hiding_wall_leaves_door_untouched() {
    let mut s = loaded();
    assert!(s.set_layer_visible("RM_WALL", false));
    assert_eq!(s.hidden_count("RM_WALL"), 3);
    assert_eq!(s.hidden_count("RM_DOOR"), 0);
}

#[test]
fn toggle_round_trip_restores_original_values() {
    let mut s = loaded();
    let before = s.document().expect("loaded").to_markup();
    assert!(s.set_layer_visible("RM_WALL", false));
    assert!(s.set_layer_visible("RM_WALL", true));
    assert_eq!(s.document().expect("loaded").to_markup(), before);
    assert_eq!(s.hidden_count("RM_WALL"), 0);
}

#[test]
fn unknown_layer_is_rejected() {
    let mut s = loaded();
    assert!(!s.set_layer_visible("NOPE", false));
    assert!(!LiveSurface::new().set_layer_visible("RM_WALL", false));
}

#[test]
fn markup_output_reparses() {
    let s = loaded();
    let SurfaceOutput::Markup(markup) = s.output() else {
        panic!("expected markup output");
    };
    let wrapper = SvgDocument::parse(&markup).expect("wrapper parses");
    assert!(wrapper.find_by_id("cv_main_drawing").is_some());
}
