//! Pan/zoom transform model and coordinate conversions.
//!
//! A [`Transform`] maps world space (the drawing's intrinsic coordinates) to
//! screen space: `screen = world * scale + translate`. The [`TransformModel`]
//! is the only writer of the current transform and keeps `scale` inside the
//! bounds of its [`ZoomProfile`].

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::time::Duration;

use crate::consts::{
    LIVE_BUTTON_STEP, LIVE_SCALE_MAX, LIVE_SCALE_MIN, RASTER_BUTTON_STEP, RASTER_SCALE_MAX, RASTER_SCALE_MIN,
    WHEEL_EXP_PER_PIXEL, WHEEL_STEP_IN, WHEEL_STEP_OUT,
};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Affine world-to-screen map (uniform scale plus translation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self { scale: 1.0, translate_x: 0.0, translate_y: 0.0 };

    #[must_use]
    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self { scale, translate_x, translate_y }
    }

    /// Convert a screen-space point to world coordinates.
    #[must_use]
    pub fn to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.translate_x) / self.scale,
            y: (screen.y - self.translate_y) / self.scale,
        }
    }

    /// Convert a world-space point to screen coordinates.
    #[must_use]
    pub fn to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.scale + self.translate_x,
            y: world.y * self.scale + self.translate_y,
        }
    }

    /// The transform as an SVG `transform` attribute value.
    #[must_use]
    pub fn to_svg_attr(&self) -> String {
        format!("translate({},{}) scale({})", self.translate_x, self.translate_y, self.scale)
    }
}

/// How a vertical wheel delta becomes a zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelPolicy {
    /// `2^(-dy * per_pixel)`, smooth for trackpads.
    Exponential { per_pixel: f64 },
    /// Fixed factor per notch regardless of delta magnitude.
    Stepped { zoom_in: f64, zoom_out: f64 },
}

impl WheelPolicy {
    /// Zoom factor for a wheel event with vertical delta `dy` (positive = down).
    #[must_use]
    pub fn factor(self, dy: f64) -> f64 {
        match self {
            Self::Exponential { per_pixel } => (-dy * per_pixel).exp2(),
            Self::Stepped { zoom_in, zoom_out } => {
                if dy < 0.0 {
                    zoom_in
                } else if dy > 0.0 {
                    zoom_out
                } else {
                    1.0
                }
            }
        }
    }
}

/// Zoom limits and input sensitivities for one surface variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomProfile {
    pub scale_min: f64,
    pub scale_max: f64,
    /// Factor applied by the zoom-in button; zoom-out applies its reciprocal.
    pub button_step: f64,
    pub wheel: WheelPolicy,
}

impl ZoomProfile {
    pub const LIVE: Self = Self {
        scale_min: LIVE_SCALE_MIN,
        scale_max: LIVE_SCALE_MAX,
        button_step: LIVE_BUTTON_STEP,
        wheel: WheelPolicy::Exponential { per_pixel: WHEEL_EXP_PER_PIXEL },
    };

    pub const RASTER: Self = Self {
        scale_min: RASTER_SCALE_MIN,
        scale_max: RASTER_SCALE_MAX,
        button_step: RASTER_BUTTON_STEP,
        wheel: WheelPolicy::Stepped { zoom_in: WHEEL_STEP_IN, zoom_out: WHEEL_STEP_OUT },
    };

    /// Clamp a requested scale into bounds. NaN yields `None`.
    #[must_use]
    pub fn clamp(&self, scale: f64) -> Option<f64> {
        if scale.is_nan() {
            return None;
        }
        Some(scale.clamp(self.scale_min, self.scale_max))
    }
}

/// Owner of the current viewport transform.
#[derive(Debug, Clone)]
pub struct TransformModel {
    current: Transform,
    initial: Transform,
    profile: ZoomProfile,
}

impl TransformModel {
    #[must_use]
    pub fn new(profile: ZoomProfile) -> Self {
        Self::with_initial(profile, Transform::IDENTITY)
    }

    /// Start from `initial` (e.g. a natural-fit transform) instead of identity.
    #[must_use]
    pub fn with_initial(profile: ZoomProfile, initial: Transform) -> Self {
        let scale = profile.clamp(initial.scale).unwrap_or(profile.scale_min);
        let initial = Transform { scale, ..initial };
        Self { current: initial, initial, profile }
    }

    #[must_use]
    pub fn current(&self) -> Transform {
        self.current
    }

    #[must_use]
    pub fn profile(&self) -> ZoomProfile {
        self.profile
    }

    /// Multiply the scale by `factor`, optionally keeping the world point under
    /// `anchor` fixed on screen.
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<Point>) -> Transform {
        let old = self.current;
        let Some(scale) = self.profile.clamp(old.scale * factor) else {
            return old;
        };
        let mut next = Transform { scale, ..old };
        if let Some(anchor) = anchor {
            let world = old.to_world(anchor);
            next.translate_x = anchor.x - world.x * scale;
            next.translate_y = anchor.y - world.y * scale;
        }
        self.current = next;
        next
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Transform {
        self.current.translate_x += dx;
        self.current.translate_y += dy;
        self.current
    }

    pub fn reset(&mut self) -> Transform {
        self.current = self.initial;
        self.current
    }

    /// Replace the whole transform. The scale is clamped; a NaN scale keeps the current one.
    pub fn apply(&mut self, transform: Transform) -> Transform {
        let scale = self.profile.clamp(transform.scale).unwrap_or(self.current.scale);
        self.current = Transform { scale, ..transform };
        self.current
    }

    #[must_use]
    pub fn to_world(&self, screen: Point) -> Point {
        self.current.to_world(screen)
    }

    #[must_use]
    pub fn to_screen(&self, world: Point) -> Point {
        self.current.to_screen(world)
    }

    /// Position of the current scale on a logarithmic slider, in `[0, 1]`.
    #[must_use]
    pub fn slider_position(&self) -> f64 {
        let ZoomProfile { scale_min, scale_max, .. } = self.profile;
        let span = (scale_max / scale_min).ln();
        if span <= 0.0 {
            return 0.0;
        }
        ((self.current.scale / scale_min).ln() / span).clamp(0.0, 1.0)
    }

    /// Set the scale from a logarithmic slider position. Translation is unchanged.
    pub fn set_slider_position(&mut self, ratio: f64) -> Transform {
        let ZoomProfile { scale_min, scale_max, .. } = self.profile;
        let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        let scale = scale_min * (scale_max / scale_min).powf(ratio);
        self.apply(Transform { scale, ..self.current })
    }
}

/// An in-flight animated move between two transforms.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    from: Transform,
    to: Transform,
    start: Duration,
    duration: Duration,
}

impl Transition {
    #[must_use]
    pub fn new(from: Transform, to: Transform, start: Duration, duration: Duration) -> Self {
        Self { from, to, start, duration }
    }

    #[must_use]
    pub fn target(&self) -> Transform {
        self.to
    }

    /// Whether the transition has reached its end at `now`.
    #[must_use]
    pub fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.start) >= self.duration
    }

    /// Interpolated transform at `now`, eased with cubic in-out.
    ///
    /// Scale is interpolated geometrically so zooming feels uniform.
    #[must_use]
    pub fn sample(&self, now: Duration) -> Transform {
        if self.duration.is_zero() || self.is_finished(now) {
            return self.to;
        }
        let t = now.saturating_sub(self.start).as_secs_f64() / self.duration.as_secs_f64();
        let e = ease_cubic_in_out(t);
        let lerp = |a: f64, b: f64| a + (b - a) * e;
        Transform {
            scale: self.from.scale * (self.to.scale / self.from.scale).powf(e),
            translate_x: lerp(self.from.translate_x, self.to.translate_x),
            translate_y: lerp(self.from.translate_y, self.to.translate_y),
        }
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}
