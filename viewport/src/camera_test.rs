#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// --- Transform conversions ---

#[test]
fn transform_default_is_identity() {
    assert_eq!(Transform::default(), Transform::IDENTITY);
}

#[test]
fn to_world_identity() {
    let world = Transform::IDENTITY.to_world(Point::new(50.0, 75.0));
    assert!(point_approx_eq(world, Point::new(50.0, 75.0)));
}

#[test]
fn to_world_with_scale_and_translate() {
    let t = Transform::new(2.0, 50.0, 50.0);
    let world = t.to_world(Point::new(150.0, 150.0));
    assert!(point_approx_eq(world, Point::new(50.0, 50.0)));
}

#[test]
fn to_screen_with_scale_and_translate() {
    let t = Transform::new(3.0, 20.0, 10.0);
    let screen = t.to_screen(Point::new(5.0, 5.0));
    assert!(point_approx_eq(screen, Point::new(35.0, 25.0)));
}

#[test]
fn round_trip_world_first() {
    for t in [
        Transform::IDENTITY,
        Transform::new(2.0, 50.0, -30.0),
        Transform::new(0.75, 13.7, -42.3),
        Transform::new(40.0, -1e4, 3e3),
    ] {
        let world = Point::new(333.3, -999.9);
        assert!(point_approx_eq(t.to_world(t.to_screen(world)), world), "{t:?}");
    }
}

#[test]
fn svg_attr_format() {
    let t = Transform::new(2.5, 10.0, -4.0);
    assert_eq!(t.to_svg_attr(), "translate(10,-4) scale(2.5)");
}

// --- Wheel policies ---

#[test]
fn stepped_wheel_direction() {
    let w = ZoomProfile::RASTER.wheel;
    assert_eq!(w.factor(-120.0), 1.1);
    assert_eq!(w.factor(3.0), 0.9);
    assert_eq!(w.factor(0.0), 1.0);
}

#[test]
fn exponential_wheel_is_symmetric() {
    let w = ZoomProfile::LIVE.wheel;
    assert!(approx_eq(w.factor(-500.0) * w.factor(500.0), 1.0));
    assert!(approx_eq(w.factor(-500.0), 2.0));
}

// --- zoom_by ---

#[test]
fn zoom_without_anchor_keeps_translation() {
    let mut m = TransformModel::new(ZoomProfile::RASTER);
    m.pan_by(10.0, 20.0);
    let t = m.zoom_by(2.0, None);
    assert!(approx_eq(t.scale, 2.0));
    assert!(approx_eq(t.translate_x, 10.0));
    assert!(approx_eq(t.translate_y, 20.0));
}

#[test]
fn zoom_keeps_anchor_fixed() {
    let mut m = TransformModel::new(ZoomProfile::RASTER);
    m.pan_by(-40.0, 15.0);
    for (factor, anchor) in [(1.1, Point::new(300.0, 200.0)), (0.5, Point::new(0.0, 0.0)), (7.0, Point::new(-20.0, 999.0))] {
        let before = m.to_world(anchor);
        m.zoom_by(factor, Some(anchor));
        assert!(point_approx_eq(m.to_world(anchor), before), "factor {factor}");
    }
}

#[test]
fn zoom_twice_at_cursor_compounds() {
    let mut m = TransformModel::new(ZoomProfile::RASTER);
    let anchor = Point::new(300.0, 200.0);
    let before = m.to_world(anchor);
    m.zoom_by(1.1, Some(anchor));
    let t = m.zoom_by(1.1, Some(anchor));
    assert!(approx_eq(t.scale, 1.21));
    assert!(point_approx_eq(m.to_world(anchor), before));
}

#[test]
fn zoom_clamps_to_bounds() {
    let mut m = TransformModel::new(ZoomProfile::LIVE);
    assert!(approx_eq(m.zoom_by(1000.0, None).scale, LIVE_SCALE_MAX));
    assert!(approx_eq(m.zoom_by(1e-6, None).scale, LIVE_SCALE_MIN));
}

#[test]
fn zoom_clamp_holds_for_many_factors() {
    let mut m = TransformModel::new(ZoomProfile::RASTER);
    for factor in [0.0, -3.0, 1e-300, 1e300, f64::INFINITY, 0.9, 1.1, 2.0, 0.5] {
        let s = m.zoom_by(factor, Some(Point::new(5.0, 5.0))).scale;
        assert!((RASTER_SCALE_MIN..=RASTER_SCALE_MAX).contains(&s), "factor {factor} gave {s}");
    }
}

#[test]
fn zoom_by_zero_clamps_to_min_without_nan() {
    let mut m = TransformModel::new(ZoomProfile::RASTER);
    let t = m.zoom_by(0.0, Some(Point::new(100.0, 100.0)));
    assert!(approx_eq(t.scale, RASTER_SCALE_MIN));
    assert!(t.translate_x.is_finite());
    assert!(t.translate_y.is_finite());
}

#[test]
fn zoom_by_nan_is_ignored() {
    let mut m = TransformModel::new(ZoomProfile::RASTER);
    m.zoom_by(2.0, None);
    let t = m.zoom_by(f64::NAN, Some(Point::new(1.0, 1.0)));
    assert!(approx_eq(t.scale, 2.0));
}

// --- pan / reset / apply ---

#[test]
fn pan_accumulates() {
    let mut m = TransformModel::new(ZoomProfile::LIVE);
    m.pan_by(5.0, -5.0);
    let t = m.pan_by(10.0, 2.0);
    assert!(approx_eq(t.translate_x, 15.0));
    assert!(approx_eq(t.translate_y, -3.0));
    assert!(approx_eq(t.scale, 1.0));
}

#[test]
fn zero_pan_is_noop() {
    let mut m = TransformModel::new(ZoomProfile::LIVE);
    let before = m.current();
    assert_eq!(m.pan_by(0.0, 0.0), before);
}

#[test]
fn reset_returns_to_initial() {
    let initial = Transform::new(0.5, 10.0, 10.0);
    let mut m = TransformModel::with_initial(ZoomProfile::RASTER, initial);
    m.zoom_by(4.0, Some(Point::new(3.0, 3.0)));
    m.pan_by(100.0, 100.0);
    assert_eq!(m.reset(), initial);
}

#[test]
fn with_initial_clamps_scale() {
    let m = TransformModel::with_initial(ZoomProfile::LIVE, Transform::new(0.1, 0.0, 0.0));
    assert!(approx_eq(m.current().scale, LIVE_SCALE_MIN));
}

#[test]
fn apply_replaces_and_clamps() {
    let mut m = TransformModel::new(ZoomProfile::LIVE);
    let t = m.apply(Transform::new(100.0, 7.0, 8.0));
    assert_eq!(t, Transform::new(LIVE_SCALE_MAX, 7.0, 8.0));
}

// --- slider ---

#[test]
fn slider_endpoints_map_to_bounds() {
    let mut m = TransformModel::new(ZoomProfile::RASTER);
    assert!(approx_eq(m.set_slider_position(0.0).scale, RASTER_SCALE_MIN));
    assert!(approx_eq(m.slider_position(), 0.0));
    assert!(approx_eq(m.set_slider_position(1.0).scale, RASTER_SCALE_MAX));
    assert!(approx_eq(m.slider_position(), 1.0));
}

#[test]
fn slider_round_trips() {
    let mut m = TransformModel::new(ZoomProfile::RASTER);
    m.set_slider_position(0.37);
    assert!(approx_eq(m.slider_position(), 0.37));
}

// --- Transition ---

#[test]
fn transition_endpoints() {
    let from = Transform::IDENTITY;
    let to = Transform::new(4.0, -100.0, 60.0);
    let tr = Transition::new(from, to, ms(1000), ms(250));
    assert_eq!(tr.sample(ms(1000)), from);
    assert_eq!(tr.sample(ms(1250)), to);
    assert_eq!(tr.sample(ms(5000)), to);
    assert!(!tr.is_finished(ms(1100)));
    assert!(tr.is_finished(ms(1250)));
}

#[test]
fn transition_midpoint_is_geometric_in_scale() {
    let tr = Transition::new(Transform::IDENTITY, Transform::new(4.0, 10.0, 0.0), ms(0), ms(200));
    let mid = tr.sample(ms(100));
    assert!(approx_eq(mid.scale, 2.0));
    assert!(approx_eq(mid.translate_x, 5.0));
}

#[test]
fn zero_duration_transition_jumps() {
    let to = Transform::new(2.0, 1.0, 1.0);
    let tr = Transition::new(Transform::IDENTITY, to, ms(10), Duration::ZERO);
    assert_eq!(tr.sample(ms(10)), to);
}
