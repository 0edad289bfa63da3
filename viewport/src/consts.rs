//! Shared numeric constants for the viewport crate.

use std::time::Duration;

// ── Zoom bounds ─────────────────────────────────────────────────

/// Minimum scale for the live vector surface.
pub const LIVE_SCALE_MIN: f64 = 1.0;

/// Maximum scale for the live vector surface.
pub const LIVE_SCALE_MAX: f64 = 24.0;

/// Minimum scale for the rasterized surface.
pub const RASTER_SCALE_MIN: f64 = 0.05;

/// Maximum scale for the rasterized surface.
pub const RASTER_SCALE_MAX: f64 = 40.0;

// ── Zoom steps ──────────────────────────────────────────────────

/// Zoom-in button factor on the live surface (zoom-out uses the reciprocal).
pub const LIVE_BUTTON_STEP: f64 = 2.0;

/// Zoom-in button factor on the rasterized surface.
pub const RASTER_BUTTON_STEP: f64 = 1.1;

/// Exponential wheel sensitivity per pixel of vertical delta.
pub const WHEEL_EXP_PER_PIXEL: f64 = 0.002;

/// Stepped wheel factor when scrolling up.
pub const WHEEL_STEP_IN: f64 = 1.1;

/// Stepped wheel factor when scrolling down.
pub const WHEEL_STEP_OUT: f64 = 0.9;

// ── Timing ──────────────────────────────────────────────────────

/// Quiet period before the stroke floor is recomputed.
pub const STROKE_DEBOUNCE: Duration = Duration::from_millis(250);

/// How long a click readout stays visible.
pub const READOUT_TIMEOUT: Duration = Duration::from_millis(1600);

/// Duration of animated button transitions.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(250);

// ── Input ───────────────────────────────────────────────────────

/// Pointer travel in screen pixels beyond which a press is a drag, not a click.
pub const CLICK_SLOP_PX: f64 = 2.0;

// ── Content ─────────────────────────────────────────────────────

/// Stroke floor used when the drawing does not declare one.
pub const DEFAULT_MIN_LINE_WIDTH: f64 = 0.6;

/// Custom style property carrying the stroke floor.
pub const LINE_WIDTH_PROPERTY: &str = "--tmsMinLineWidth";

/// Attribute the live surface keys layers by.
pub const LAYER_NAME_ATTR: &str = "cvjs:layername";

/// Metadata entry holding the converter's layer table.
pub const LAYER_TABLE_KEY: &str = "cadviewer_LayerTable";

/// Element whose text stroke is normalized on load.
pub const MAIN_DRAWING_ID: &str = "cv_main_drawing";

/// Largest side, in pixels, of the offscreen raster.
pub const MAX_RASTER_DIM: u32 = 8192;
