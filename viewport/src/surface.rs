//! The drawing-surface contract shared by the live and rasterized backends.
//!
//! A surface owns the parsed drawing and paints it under a [`Transform`]. The
//! engine picks one implementation when it is created and never mixes them.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use resvg::tiny_skia::Pixmap;

use crate::camera::{Transform, ZoomProfile};
use crate::consts::DEFAULT_MIN_LINE_WIDTH;
use crate::doc::{LayerIndex, LayerSelector, NodeId, SvgDocument};
use crate::error::{ParseError, RenderError};

/// Which backend a surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceKind {
    /// Retained vector markup; the host's compositor applies the transform.
    #[default]
    Live,
    /// Offscreen raster composited under the transform.
    Raster,
}

impl SurfaceKind {
    /// Zoom bounds and input sensitivities for this backend.
    #[must_use]
    pub fn profile(self) -> ZoomProfile {
        match self {
            Self::Live => ZoomProfile::LIVE,
            Self::Raster => ZoomProfile::RASTER,
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Live => "live",
            Self::Raster => "raster",
        })
    }
}

impl FromStr for SurfaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" | "svg" | "vector" => Ok(Self::Live),
            "raster" | "canvas" => Ok(Self::Raster),
            other => Err(format!("unknown surface kind '{other}' (expected 'live' or 'raster')")),
        }
    }
}

/// Rendering parameters published by the engine and read on every paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// Current stroke floor, written by the stroke-width controller.
    pub min_line_width: f64,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self { min_line_width: DEFAULT_MIN_LINE_WIDTH }
    }
}

/// The container the surface paints into, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Device pixel ratio.
    pub dpr: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 0.0, height: 0.0, dpr: 1.0 }
    }
}

/// What a surface hands back to its host after painting.
#[derive(Debug)]
pub enum SurfaceOutput<'a> {
    /// Nothing loaded yet.
    Empty,
    /// Complete viewer markup with the transform applied.
    Markup(String),
    /// The composited frame in device pixels.
    Pixels(&'a Pixmap),
}

/// Capability set every drawing backend implements.
pub trait DrawingSurface {
    fn kind(&self) -> SurfaceKind;

    /// Replace the drawing with `raw` markup.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the markup cannot be used; the previously
    /// loaded drawing is left untouched.
    fn load(&mut self, raw: &str) -> Result<(), ParseError>;

    /// Paint the current drawing under `transform`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the backend cannot produce a frame; the
    /// previous frame stays current.
    fn render(&mut self, transform: Transform, ctx: &RenderContext) -> Result<(), RenderError>;

    /// Show or hide every element selected by `layer`. Returns false when the
    /// drawing has no such layer key.
    fn set_layer_visible(&mut self, layer: &str, visible: bool) -> bool;

    /// Distinct layer keys in document order.
    fn extract_layer_candidates(&self) -> Vec<String>;

    /// The parsed drawing, if one is loaded.
    fn document(&self) -> Option<&SvgDocument>;

    /// Intrinsic size of the drawing in world units.
    fn world_size(&self) -> Option<(f64, f64)>;

    /// The container changed size or density.
    fn set_viewport(&mut self, _viewport: Viewport) {}

    fn output(&self) -> SurfaceOutput<'_>;
}

/// Layer index plus the attribute values needed to undo a hide.
///
/// Showing a layer restores each element's original value of the visibility
/// attribute (or removes it if there was none), so off-then-on is exact.
#[derive(Debug, Clone, Default)]
pub struct VisibilityIndex {
    index: LayerIndex,
    attr: &'static str,
    hidden: &'static str,
    originals: HashMap<NodeId, Option<String>>,
}

impl VisibilityIndex {
    /// Index `doc` by `selector`, toggling `attr` between `hidden` and its original value.
    #[must_use]
    pub fn build(doc: &SvgDocument, selector: &LayerSelector, attr: &'static str, hidden: &'static str) -> Self {
        let index = doc.layer_index(selector);
        let originals = index
            .keys()
            .iter()
            .flat_map(|key| index.members(key))
            .map(|&id| (id, doc.attr(id, attr).map(str::to_owned)))
            .collect();
        Self { index, attr, hidden, originals }
    }

    #[must_use]
    pub fn keys(&self) -> &[String] {
        self.index.keys()
    }

    /// Apply visibility for `key` to `doc`. Returns false for unknown keys.
    pub fn apply(&self, doc: &mut SvgDocument, key: &str, visible: bool) -> bool {
        if !self.index.contains(key) {
            return false;
        }
        for &id in self.index.members(key) {
            let value = if visible {
                self.originals.get(&id).and_then(Option::as_deref)
            } else {
                Some(self.hidden)
            };
            doc.set_attr(id, self.attr, value);
        }
        true
    }

    /// Number of elements under `key` currently carrying the hidden value.
    #[must_use]
    pub fn hidden_count(&self, doc: &SvgDocument, key: &str) -> usize {
        self.index
            .members(key)
            .iter()
            .filter(|&&id| doc.attr(id, self.attr) == Some(self.hidden))
            .count()
    }
}
