//! Rasterized surface.
//!
//! The drawing is rasterized once per content change into an offscreen
//! pixmap at device resolution. Every frame only composites that pixmap onto
//! the visible frame under the current transform, so panning and zooming never
//! re-rasterize. Layer toggles and stroke-floor changes mark the raster dirty.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use std::fmt;

use resvg::tiny_skia::{self, Pixmap, PixmapPaint};
use resvg::usvg;

use crate::camera::Transform;
use crate::consts::{DEFAULT_MIN_LINE_WIDTH, MAX_RASTER_DIM};
use crate::doc::{LayerSelector, SvgDocument};
use crate::error::{ParseError, RenderError};
use crate::stroke;
use crate::surface::{DrawingSurface, RenderContext, SurfaceKind, SurfaceOutput, Viewport, VisibilityIndex};

struct RasterContent {
    doc: SvgDocument,
    layers: VisibilityIndex,
    size: (f64, f64),
    raster: Pixmap,
    resolution: f64,
    line_width: f64,
    dirty: bool,
}

/// Offscreen-raster surface; layers are `<g>` elements keyed by `id`.
pub struct RasterSurface {
    options: usvg::Options<'static>,
    viewport: Viewport,
    content: Option<RasterContent>,
    frame: Option<Pixmap>,
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("viewport", &self.viewport)
            .field("size", &self.content.as_ref().map(|c| c.size))
            .field("resolution", &self.content.as_ref().map(|c| c.resolution))
            .field("dirty", &self.content.as_ref().is_some_and(|c| c.dirty))
            .finish_non_exhaustive()
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterSurface {
    /// A surface with the system font database loaded.
    #[must_use]
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        Self::with_options(options)
    }

    #[must_use]
    pub fn with_options(options: usvg::Options<'static>) -> Self {
        Self { options, viewport: Viewport::default(), content: None, frame: None }
    }

    /// The offscreen raster, independent of the view transform.
    #[must_use]
    pub fn raster(&self) -> Option<&Pixmap> {
        self.content.as_ref().map(|c| &c.raster)
    }

    /// The last composited frame.
    #[must_use]
    pub fn frame(&self) -> Option<&Pixmap> {
        self.frame.as_ref()
    }

    /// True when the next render must re-rasterize.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.content.as_ref().is_some_and(|c| c.dirty)
    }

    /// Elements of `layer` currently hidden.
    #[must_use]
    pub fn hidden_count(&self, layer: &str) -> usize {
        self.content.as_ref().map_or(0, |c| c.layers.hidden_count(&c.doc, layer))
    }

    fn build_tree(&self, doc: &SvgDocument, line_width: f64) -> Result<usvg::Tree, ParseError> {
        let markup = doc.to_markup_with(|css| stroke::substitute_width(css, line_width));
        Ok(usvg::Tree::from_str(&markup, &self.options)?)
    }
}

/// Offscreen resolution: device pixels per world unit, capped so the longest
/// raster side stays within [`MAX_RASTER_DIM`].
fn raster_resolution(size: (f64, f64), dpr: f64) -> f64 {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let longest = size.0.max(size.1);
    if longest <= 0.0 {
        return dpr;
    }
    dpr.min(f64::from(MAX_RASTER_DIM) / longest)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixel_dim(len: f64) -> u32 {
    len.ceil().clamp(1.0, f64::from(MAX_RASTER_DIM)) as u32
}

#[allow(clippy::cast_possible_truncation)]
fn rasterize(tree: &usvg::Tree, resolution: f64) -> Result<Pixmap, ParseError> {
    let size = tree.size();
    let width = pixel_dim(f64::from(size.width()) * resolution);
    let height = pixel_dim(f64::from(size.height()) * resolution);
    let mut pixmap = Pixmap::new(width, height).ok_or(ParseError::RasterSize { width, height })?;
    let scale = resolution as f32;
    resvg::render(tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    Ok(pixmap)
}

impl DrawingSurface for RasterSurface {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Raster
    }

    fn load(&mut self, raw: &str) -> Result<(), ParseError> {
        let doc = SvgDocument::parse(raw)?;
        let layers = VisibilityIndex::build(&doc, &LayerSelector::GroupId, "display", "none");
        let line_width = stroke::declared_width(&doc.style_text()).unwrap_or(DEFAULT_MIN_LINE_WIDTH);
        let tree = self.build_tree(&doc, line_width)?;
        let size = (f64::from(tree.size().width()), f64::from(tree.size().height()));
        let resolution = raster_resolution(size, self.viewport.dpr);
        let raster = rasterize(&tree, resolution)?;
        tracing::debug!(
            layers = layers.keys().len(),
            width = raster.width(),
            height = raster.height(),
            "raster surface loaded"
        );
        self.content = Some(RasterContent { doc, layers, size, raster, resolution, line_width, dirty: false });
        self.frame = None;
        Ok(())
    }

    fn render(&mut self, transform: Transform, ctx: &RenderContext) -> Result<(), RenderError> {
        let Some(content) = self.content.as_ref() else {
            return Ok(());
        };
        let resolution = raster_resolution(content.size, self.viewport.dpr);
        let stale = content.dirty
            || (content.line_width - ctx.min_line_width).abs() > f64::EPSILON
            || (content.resolution - resolution).abs() > f64::EPSILON;
        if stale {
            let tree = self.build_tree(&content.doc, ctx.min_line_width)?;
            let raster = rasterize(&tree, resolution)?;
            tracing::debug!(resolution, line_width = ctx.min_line_width, "re-rasterized drawing");
            if let Some(content) = self.content.as_mut() {
                content.raster = raster;
                content.resolution = resolution;
                content.line_width = ctx.min_line_width;
                content.dirty = false;
            }
        }
        let Some(content) = self.content.as_ref() else {
            return Ok(());
        };

        let dpr = if self.viewport.dpr > 0.0 { self.viewport.dpr } else { 1.0 };
        let (view_w, view_h) = if self.viewport.width > 0.0 && self.viewport.height > 0.0 {
            (self.viewport.width, self.viewport.height)
        } else {
            content.size
        };
        let width = pixel_dim(view_w * dpr);
        let height = pixel_dim(view_h * dpr);
        let mut frame = match self.frame.take() {
            Some(mut f) if f.width() == width && f.height() == height => {
                f.fill(tiny_skia::Color::TRANSPARENT);
                f
            }
            _ => Pixmap::new(width, height).ok_or(ParseError::RasterSize { width, height })?,
        };
        let composite = composite_transform(transform, dpr, content.resolution);
        frame.draw_pixmap(0, 0, content.raster.as_ref(), &PixmapPaint::default(), composite, None);
        self.frame = Some(frame);
        Ok(())
    }

    fn set_layer_visible(&mut self, layer: &str, visible: bool) -> bool {
        let Some(content) = self.content.as_mut() else {
            return false;
        };
        let applied = content.layers.apply(&mut content.doc, layer, visible);
        if applied {
            content.dirty = true;
        }
        applied
    }

    fn extract_layer_candidates(&self) -> Vec<String> {
        self.content.as_ref().map_or_else(Vec::new, |c| c.layers.keys().to_vec())
    }

    fn document(&self) -> Option<&SvgDocument> {
        self.content.as_ref().map(|c| &c.doc)
    }

    fn world_size(&self) -> Option<(f64, f64)> {
        self.content.as_ref().map(|c| c.size)
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn output(&self) -> SurfaceOutput<'_> {
        self.frame.as_ref().map_or(SurfaceOutput::Empty, SurfaceOutput::Pixels)
    }
}

/// Map raster pixels to frame pixels: undo the raster resolution, apply the
/// view transform, then scale to device pixels.
#[allow(clippy::cast_possible_truncation)]
fn composite_transform(view: Transform, dpr: f64, resolution: f64) -> tiny_skia::Transform {
    let sx = dpr * view.scale / resolution;
    tiny_skia::Transform::from_row(
        sx as f32,
        0.0,
        0.0,
        sx as f32,
        (dpr * view.translate_x) as f32,
        (dpr * view.translate_y) as f32,
    )
}
