//! Live vector surface.
//!
//! Keeps the drawing as retained markup nested in a viewer `<svg>`. Rendering
//! only rewrites the container group's `transform` attribute and the stroke
//! floor style property; the host compositor does the rest. Screen space is
//! the viewer's user space, which shares the drawing's `viewBox`.

#[cfg(test)]
#[path = "live_test.rs"]
mod live_test;

use crate::camera::Transform;
use crate::consts::{LAYER_NAME_ATTR, LINE_WIDTH_PROPERTY, MAIN_DRAWING_ID};
use crate::doc::{LayerSelector, SvgDocument, escape_attr};
use crate::error::{ParseError, RenderError};
use crate::stroke;
use crate::surface::{DrawingSurface, RenderContext, SurfaceKind, SurfaceOutput, VisibilityIndex};

#[derive(Debug, Clone)]
struct LiveContent {
    doc: SvgDocument,
    layers: VisibilityIndex,
    container_transform: String,
    line_width: f64,
}

/// Retained-markup surface; layers are keyed by an element attribute.
#[derive(Debug, Clone)]
pub struct LiveSurface {
    selector: LayerSelector,
    content: Option<LiveContent>,
}

impl Default for LiveSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveSurface {
    /// Layers keyed by the `cvjs:layername` attribute.
    #[must_use]
    pub fn new() -> Self {
        Self::with_selector(LayerSelector::Attribute(LAYER_NAME_ATTR.to_owned()))
    }

    #[must_use]
    pub fn with_selector(selector: LayerSelector) -> Self {
        Self { selector, content: None }
    }

    /// Current value of the container group's `transform` attribute.
    #[must_use]
    pub fn container_transform(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.container_transform.as_str())
    }

    /// Elements of `layer` currently hidden.
    #[must_use]
    pub fn hidden_count(&self, layer: &str) -> usize {
        self.content.as_ref().map_or(0, |c| c.layers.hidden_count(&c.doc, layer))
    }

    /// Full viewer markup: wrapper `<svg>`, transformed group, drawing.
    #[must_use]
    pub fn markup(&self) -> Option<String> {
        let content = self.content.as_ref()?;
        let mut out = String::from(
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="fp-svg" width="100%" height="100%" preserveAspectRatio="xMidYMid meet""#,
        );
        if let Some(vb) = content.doc.view_box() {
            out.push_str(" viewBox=\"");
            out.push_str(&escape_attr(vb));
            out.push('"');
        }
        out.push_str(&format!(r#" style="{LINE_WIDTH_PROPERTY}: {}">"#, content.line_width));
        out.push_str(&format!(r#"<g class="fp-svg-group" transform="{}">"#, content.container_transform));
        out.push_str(&content.doc.to_markup());
        out.push_str("</g></svg>");
        Some(out)
    }
}

impl DrawingSurface for LiveSurface {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Live
    }

    fn load(&mut self, raw: &str) -> Result<(), ParseError> {
        let mut doc = SvgDocument::parse(raw)?;
        if let Some(main) = doc.find_by_id(MAIN_DRAWING_ID) {
            doc.set_attr(main, "stroke-width", Some("0"));
        }
        let layers = VisibilityIndex::build(&doc, &self.selector, "visibility", "hidden");
        let line_width = stroke::base_line_width(&doc);
        tracing::debug!(layers = layers.keys().len(), "live surface loaded");
        self.content = Some(LiveContent {
            doc,
            layers,
            container_transform: Transform::IDENTITY.to_svg_attr(),
            line_width,
        });
        Ok(())
    }

    fn render(&mut self, transform: Transform, ctx: &RenderContext) -> Result<(), RenderError> {
        if let Some(content) = self.content.as_mut() {
            content.container_transform = transform.to_svg_attr();
            content.line_width = ctx.min_line_width;
        }
        Ok(())
    }

    fn set_layer_visible(&mut self, layer: &str, visible: bool) -> bool {
        let Some(content) = self.content.as_mut() else {
            return false;
        };
        content.layers.apply(&mut content.doc, layer, visible)
    }

    fn extract_layer_candidates(&self) -> Vec<String> {
        self.content.as_ref().map_or_else(Vec::new, |c| c.layers.keys().to_vec())
    }

    fn document(&self) -> Option<&SvgDocument> {
        self.content.as_ref().map(|c| &c.doc)
    }

    fn world_size(&self) -> Option<(f64, f64)> {
        self.content.as_ref()?.doc.intrinsic_size()
    }

    fn output(&self) -> SurfaceOutput<'_> {
        self.markup().map_or(SurfaceOutput::Empty, SurfaceOutput::Markup)
    }
}
