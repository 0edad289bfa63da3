//! The viewport engine: one drawing surface plus the transform, layer,
//! stroke-width, and inspector state scoped to the loaded drawing.
//!
//! The engine is host-driven. Every handler takes the current monotonic time,
//! runs to completion, and returns [`Action`]s for the host to act on. Paints
//! are coalesced: handlers only request a frame, and the host calls
//! [`Engine::on_frame`] when it is ready to paint.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::time::Duration;

use crate::camera::{Point, Transform, TransformModel, Transition};
use crate::consts::{READOUT_TIMEOUT, STROKE_DEBOUNCE, TRANSITION_DURATION};
use crate::error::{FetchError, RenderError, ViewportError};
use crate::input::{Button, InputState, Modifiers, WheelDelta, exceeds_slop};
use crate::inspector::{PointerInspector, Readout};
use crate::layers::{Layer, LayerRegistry, LayerSource};
use crate::live::LiveSurface;
use crate::metadata::{self, LayerRecord, Metadata};
use crate::raster::RasterSurface;
use crate::stroke::{self, StrokeWidthController};
use crate::surface::{DrawingSurface, RenderContext, SurfaceKind, SurfaceOutput, Viewport};

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Schedule a call to [`Engine::on_frame`] on the next display frame.
    RenderNeeded,
    /// Show the click readout.
    ReadoutShown(Readout),
    /// Clear the click readout.
    ReadoutHidden,
    /// The published stroke floor changed.
    StrokeWidthChanged(f64),
    /// The layer list or a layer's visibility changed.
    LayersChanged,
}

/// Engine tunables. Defaults come from [`crate::consts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub stroke_debounce: Duration,
    pub readout_timeout: Duration,
    pub transition_duration: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stroke_debounce: STROKE_DEBOUNCE,
            readout_timeout: READOUT_TIMEOUT,
            transition_duration: TRANSITION_DURATION,
        }
    }
}

/// Handle for one in-flight load. Only the most recent ticket is honored,
/// and only once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Fetched drawing content plus the converter's layer table, if it sent one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawingPayload {
    pub markup: String,
    pub layer_table: Option<Vec<LayerRecord>>,
}

impl From<String> for DrawingPayload {
    fn from(markup: String) -> Self {
        Self { markup, layer_table: None }
    }
}

impl From<&str> for DrawingPayload {
    fn from(markup: &str) -> Self {
        Self::from(markup.to_owned())
    }
}

/// Result of [`Engine::finish_load`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The drawing replaced the previous one.
    Loaded(Vec<Action>),
    /// A newer load started first; this result was discarded.
    Superseded,
}

pub struct Engine {
    surface: Box<dyn DrawingSurface>,
    transform: TransformModel,
    layers: LayerRegistry,
    stroke: StrokeWidthController,
    inspector: PointerInspector,
    metadata: Metadata,
    ctx: RenderContext,
    input: InputState,
    viewport: Viewport,
    config: EngineConfig,
    transition: Option<Transition>,
    generation: u64,
    loaded: bool,
    frame_pending: bool,
}

impl Engine {
    #[must_use]
    pub fn new(surface: Box<dyn DrawingSurface>) -> Self {
        Self::with_config(surface, EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(surface: Box<dyn DrawingSurface>, config: EngineConfig) -> Self {
        let profile = surface.kind().profile();
        Self {
            surface,
            transform: TransformModel::new(profile),
            layers: LayerRegistry::default(),
            stroke: StrokeWidthController::new(config.stroke_debounce),
            inspector: PointerInspector::new(config.readout_timeout),
            metadata: Metadata::default(),
            ctx: RenderContext::default(),
            input: InputState::Idle,
            viewport: Viewport::default(),
            config,
            transition: None,
            generation: 0,
            loaded: false,
            frame_pending: false,
        }
    }

    /// An engine over the stock surface for `kind`.
    #[must_use]
    pub fn for_kind(kind: SurfaceKind, config: EngineConfig) -> Self {
        let surface: Box<dyn DrawingSurface> = match kind {
            SurfaceKind::Live => Box::new(LiveSurface::new()),
            SurfaceKind::Raster => Box::new(RasterSurface::new()),
        };
        Self::with_config(surface, config)
    }

    // --- Viewport ---

    /// The container was measured or resized.
    pub fn set_viewport(&mut self, viewport: Viewport, now: Duration) -> Vec<Action> {
        self.viewport = viewport;
        self.surface.set_viewport(viewport);
        let mut actions = Vec::new();
        if self.loaded {
            let natural_k = self.natural_fit();
            self.stroke.set_natural_k(natural_k);
            self.transform_changed(now, &mut actions);
        }
        actions
    }

    // --- Loading ---

    /// Start a load. Any load still in flight is superseded.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket { generation: self.generation }
    }

    /// Complete the load identified by `ticket` with the fetched payload.
    ///
    /// # Errors
    ///
    /// Returns [`ViewportError::Fetch`] or [`ViewportError::Parse`] when the
    /// payload cannot be used. Either way the previous drawing stays loaded
    /// and interactive.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<DrawingPayload, FetchError>,
        now: Duration,
    ) -> Result<LoadOutcome, ViewportError> {
        if ticket.generation != self.generation {
            tracing::debug!(ticket = ticket.generation, current = self.generation, "discarding superseded load");
            return Ok(LoadOutcome::Superseded);
        }
        // A ticket completes once; finishing it again is stale.
        self.generation += 1;
        let payload = result?;
        self.install(payload, now).map(LoadOutcome::Loaded)
    }

    /// Load markup that is already in hand.
    ///
    /// # Errors
    ///
    /// Returns [`ViewportError::Parse`] when the markup cannot be used.
    pub fn load_markup(&mut self, payload: impl Into<DrawingPayload>, now: Duration) -> Result<Vec<Action>, ViewportError> {
        self.begin_load();
        self.install(payload.into(), now)
    }

    fn install(&mut self, payload: DrawingPayload, now: Duration) -> Result<Vec<Action>, ViewportError> {
        self.surface.load(&payload.markup)?;

        let (metadata, base) = match self.surface.document() {
            Some(doc) => (metadata::extract(doc), stroke::base_line_width(doc)),
            None => (Metadata::default(), self.ctx.min_line_width),
        };
        let source = match payload.layer_table {
            Some(table) => LayerSource::Table(table),
            None => match metadata.layer_table() {
                Ok(Some(table)) => LayerSource::Table(table),
                Ok(None) => LayerSource::Candidates(self.surface.extract_layer_candidates()),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring embedded layer table");
                    LayerSource::Candidates(self.surface.extract_layer_candidates())
                }
            },
        };
        self.layers = LayerRegistry::init_from(source);
        self.layers.sync(self.surface.as_mut());
        self.metadata = metadata;

        let mut actions = Vec::new();
        if self.inspector.readout().is_some() {
            actions.push(Action::ReadoutHidden);
        }
        self.inspector.clear();
        self.transform = TransformModel::new(self.surface.kind().profile());
        self.transition = None;
        self.input = InputState::Idle;
        let natural_k = self.natural_fit();
        self.stroke.reset(base, natural_k, &mut self.ctx);
        self.loaded = true;

        tracing::info!(
            surface = %self.surface.kind(),
            layers = self.layers.len(),
            metadata = self.metadata.len(),
            min_line_width = base,
            "drawing loaded"
        );
        actions.push(Action::LayersChanged);
        actions.push(Action::StrokeWidthChanged(base));
        self.transform_changed(now, &mut actions);
        Ok(actions)
    }

    // --- Commands ---

    /// Animated zoom in by the profile's button step about the view center.
    pub fn zoom_in(&mut self, now: Duration) -> Vec<Action> {
        self.animate_zoom(self.transform.profile().button_step, now)
    }

    /// Animated zoom out by the reciprocal of the button step.
    pub fn zoom_out(&mut self, now: Duration) -> Vec<Action> {
        self.animate_zoom(1.0 / self.transform.profile().button_step, now)
    }

    /// Animated return to the initial transform.
    pub fn reset_view(&mut self, now: Duration) -> Vec<Action> {
        let mut target = self.transform.clone();
        let to = target.reset();
        self.animate_to(to, now)
    }

    /// Immediate zoom, optionally about a screen anchor.
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<Point>, now: Duration) -> Vec<Action> {
        let mut actions = Vec::new();
        self.transition = None;
        self.transform.zoom_by(factor, anchor);
        self.transform_changed(now, &mut actions);
        actions
    }

    /// Set the zoom from a logarithmic slider position in `[0, 1]`.
    pub fn set_slider(&mut self, ratio: f64, now: Duration) -> Vec<Action> {
        let mut actions = Vec::new();
        self.transition = None;
        self.transform.set_slider_position(ratio);
        self.transform_changed(now, &mut actions);
        actions
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64, now: Duration) -> Vec<Action> {
        let mut actions = Vec::new();
        self.transition = None;
        self.transform.pan_by(dx, dy);
        self.transform_changed(now, &mut actions);
        actions
    }

    /// Show or hide a layer on both the registry and the surface.
    ///
    /// # Errors
    ///
    /// Returns [`ViewportError::UnknownLayer`] for names not in the registry.
    pub fn toggle_layer(&mut self, name: &str, visible: bool) -> Result<Vec<Action>, ViewportError> {
        self.layers.toggle(name, visible, self.surface.as_mut())?;
        let mut actions = vec![Action::LayersChanged];
        self.request_render(&mut actions);
        Ok(actions)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers, _now: Duration) -> Vec<Action> {
        if !self.loaded || !button.drives_viewport(modifiers) {
            return Vec::new();
        }
        self.transition = None;
        self.input = InputState::press(screen);
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers, now: Duration) -> Vec<Action> {
        let InputState::Pressed { origin, last, dragging } = self.input else {
            return Vec::new();
        };
        if !dragging && !exceeds_slop(origin, screen) {
            return Vec::new();
        }
        self.input = InputState::Pressed { origin, last: screen, dragging: true };
        self.pan_by(screen.x - last.x, screen.y - last.y, now)
    }

    pub fn on_pointer_up(&mut self, screen: Point, button: Button, _modifiers: Modifiers, now: Duration) -> Vec<Action> {
        let InputState::Pressed { origin, last, dragging } = self.input else {
            return Vec::new();
        };
        if button != Button::Primary {
            return Vec::new();
        }
        self.input = InputState::Idle;
        if dragging || exceeds_slop(origin, screen) {
            return self.pan_by(screen.x - last.x, screen.y - last.y, now);
        }
        let readout = self.inspector.click(screen, &self.transform.current(), now);
        tracing::debug!(%readout, "pointer inspected");
        vec![Action::ReadoutShown(readout)]
    }

    /// Zoom toward the cursor by the profile's wheel policy.
    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta, _modifiers: Modifiers, now: Duration) -> Vec<Action> {
        if !self.loaded {
            return Vec::new();
        }
        let factor = self.transform.profile().wheel.factor(delta.dy);
        self.zoom_by(factor, Some(screen), now)
    }

    // --- Frames and timers ---

    /// Paint one frame, advancing any in-flight transition.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the surface cannot paint; the previous
    /// frame stays current and the engine remains usable.
    pub fn on_frame(&mut self, now: Duration) -> Result<Vec<Action>, RenderError> {
        self.frame_pending = false;
        let mut actions = Vec::new();
        if let Some(transition) = self.transition {
            self.transform.apply(transition.sample(now));
            self.stroke.schedule(now);
            if transition.is_finished(now) {
                self.transition = None;
            } else {
                self.request_render(&mut actions);
            }
        }
        if let Err(e) = self.surface.render(self.transform.current(), &self.ctx) {
            tracing::warn!(error = %e, "frame dropped");
            return Err(e);
        }
        Ok(actions)
    }

    /// Fire any timers whose deadline has passed.
    pub fn tick(&mut self, now: Duration) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(width) = self.stroke.poll(now, self.transform.current().scale, &mut self.ctx) {
            actions.push(Action::StrokeWidthChanged(width));
            self.request_render(&mut actions);
        }
        if self.inspector.poll(now) {
            actions.push(Action::ReadoutHidden);
        }
        actions
    }

    /// The earliest time [`Engine::tick`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.stroke.deadline(), self.inspector.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn kind(&self) -> SurfaceKind {
        self.surface.kind()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform.current()
    }

    /// Map a screen point through the inverse of the current transform.
    #[must_use]
    pub fn to_world(&self, screen: Point) -> Point {
        self.transform.to_world(screen)
    }

    #[must_use]
    pub fn slider_position(&self) -> f64 {
        self.transform.slider_position()
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        self.layers.layers()
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[must_use]
    pub fn readout(&self) -> Option<Readout> {
        self.inspector.readout()
    }

    #[must_use]
    pub fn render_context(&self) -> RenderContext {
        self.ctx
    }

    #[must_use]
    pub fn natural_k(&self) -> f64 {
        self.stroke.natural_k()
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    #[must_use]
    pub fn is_render_pending(&self) -> bool {
        self.frame_pending
    }

    #[must_use]
    pub fn surface(&self) -> &dyn DrawingSurface {
        self.surface.as_ref()
    }

    #[must_use]
    pub fn output(&self) -> SurfaceOutput<'_> {
        self.surface.output()
    }

    // --- Internals ---

    fn request_render(&mut self, actions: &mut Vec<Action>) {
        if !self.frame_pending {
            self.frame_pending = true;
            actions.push(Action::RenderNeeded);
        }
    }

    fn transform_changed(&mut self, now: Duration, actions: &mut Vec<Action>) {
        self.stroke.schedule(now);
        self.request_render(actions);
    }

    fn natural_fit(&self) -> f64 {
        stroke::natural_fit((self.viewport.width, self.viewport.height), self.surface.world_size())
    }

    /// Center of the screen space the transform maps into. The live surface
    /// shares the drawing's user space, including the `viewBox` origin; the
    /// raster surface uses CSS pixels.
    fn view_center(&self) -> Option<Point> {
        let (x, y, w, h) = match self.surface.kind() {
            SurfaceKind::Live => {
                let doc = self.surface.document()?;
                match doc.view_box_rect() {
                    Some(rect) => rect,
                    None => {
                        let (w, h) = doc.intrinsic_size()?;
                        (0.0, 0.0, w, h)
                    }
                }
            }
            SurfaceKind::Raster => (0.0, 0.0, self.viewport.width, self.viewport.height),
        };
        (w > 0.0 && h > 0.0).then(|| Point::new(x + w / 2.0, y + h / 2.0))
    }

    fn animate_zoom(&mut self, factor: f64, now: Duration) -> Vec<Action> {
        let mut target = self.transform.clone();
        let to = target.zoom_by(factor, self.view_center());
        self.animate_to(to, now)
    }

    fn animate_to(&mut self, to: Transform, now: Duration) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.config.transition_duration.is_zero() {
            self.transition = None;
            self.transform.apply(to);
        } else {
            let from = self.transform.current();
            self.transition = Some(Transition::new(from, to, now, self.config.transition_duration));
        }
        self.transform_changed(now, &mut actions);
        actions
    }
}
