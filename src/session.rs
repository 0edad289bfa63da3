//! Headless host loop: drives an [`Engine`] on a simulated clock.
//!
//! A browser host would call `on_frame` from its frame callback and `tick`
//! from a timer. Here time only moves when the session advances it, so a
//! scripted run is deterministic.

use std::str::FromStr;
use std::time::Duration;

use viewport::camera::Point;
use viewport::input::{Button, Modifiers, WheelDelta};
use viewport::inspector::Readout;
use viewport::{Action, DrawingPayload, Engine, FetchError, LoadOutcome};

use crate::error::HostError;

/// Simulated display frame interval.
pub const FRAME: Duration = Duration::from_millis(16);

const MAX_SETTLE_STEPS: usize = 10_000;

/// One scripted interaction, parsed from `kind[=args]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `zoom=F`: immediate zoom about the origin.
    Zoom(f64),
    /// `zoom-in` / `zoom-out` / `reset`: the animated button commands.
    ZoomIn,
    ZoomOut,
    Reset,
    /// `pan=DX,DY`
    Pan(f64, f64),
    /// `slider=R` with `R` in `[0, 1]`.
    Slider(f64),
    /// `wheel=X,Y,DY`
    Wheel(Point, f64),
    /// `drag=X0,Y0,X1,Y1`
    Drag(Point, Point),
    /// `click=X,Y`
    Click(Point),
    /// `hide=LAYER` / `show=LAYER`
    Layer(String, bool),
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, args) = s.split_once('=').unwrap_or((s, ""));
        let nums = || -> Result<Vec<f64>, String> {
            args.split(',').map(|n| n.trim().parse::<f64>().map_err(|e| format!("{s}: {e}"))).collect()
        };
        let step = match (kind.trim(), nums()) {
            ("zoom-in", _) => Self::ZoomIn,
            ("zoom-out", _) => Self::ZoomOut,
            ("reset", _) => Self::Reset,
            ("hide", _) if !args.is_empty() => Self::Layer(args.to_string(), false),
            ("show", _) if !args.is_empty() => Self::Layer(args.to_string(), true),
            ("zoom", Ok(n)) if n.len() == 1 => Self::Zoom(n[0]),
            ("slider", Ok(n)) if n.len() == 1 => Self::Slider(n[0]),
            ("pan", Ok(n)) if n.len() == 2 => Self::Pan(n[0], n[1]),
            ("click", Ok(n)) if n.len() == 2 => Self::Click(Point::new(n[0], n[1])),
            ("wheel", Ok(n)) if n.len() == 3 => Self::Wheel(Point::new(n[0], n[1]), n[2]),
            ("drag", Ok(n)) if n.len() == 4 => Self::Drag(Point::new(n[0], n[1]), Point::new(n[2], n[3])),
            (_, Err(e)) => return Err(e),
            _ => return Err(format!("unrecognized step `{s}`")),
        };
        Ok(step)
    }
}

pub struct Session {
    engine: Engine,
    now: Duration,
    last_readout: Option<Readout>,
}

impl Session {
    pub fn new(engine: Engine) -> Self {
        Self { engine, now: Duration::ZERO, last_readout: None }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// The most recent click readout, kept after the engine hides it.
    pub fn last_readout(&self) -> Option<Readout> {
        self.last_readout
    }

    /// Complete a two-phase load with an already-fetched result.
    pub fn load(&mut self, result: Result<DrawingPayload, FetchError>) -> Result<(), HostError> {
        let ticket = self.engine.begin_load();
        match self.engine.finish_load(ticket, result, self.now)? {
            LoadOutcome::Loaded(actions) => self.handle(actions),
            LoadOutcome::Superseded => tracing::warn!("load superseded"),
        }
        Ok(())
    }

    pub fn apply(&mut self, step: &Step) -> Result<(), HostError> {
        let now = self.now;
        let none = Modifiers::default();
        let actions = match step {
            Step::Zoom(f) => self.engine.zoom_by(*f, None, now),
            Step::ZoomIn => self.engine.zoom_in(now),
            Step::ZoomOut => self.engine.zoom_out(now),
            Step::Reset => self.engine.reset_view(now),
            Step::Pan(dx, dy) => self.engine.pan_by(*dx, *dy, now),
            Step::Slider(r) => self.engine.set_slider(*r, now),
            Step::Wheel(at, dy) => self.engine.on_wheel(*at, WheelDelta { dx: 0.0, dy: *dy }, none, now),
            Step::Drag(from, to) => {
                let mut actions = self.engine.on_pointer_down(*from, Button::Primary, none, now);
                actions.extend(self.engine.on_pointer_move(*to, none, now));
                actions.extend(self.engine.on_pointer_up(*to, Button::Primary, none, now));
                actions
            }
            Step::Click(at) => {
                let mut actions = self.engine.on_pointer_down(*at, Button::Primary, none, now);
                actions.extend(self.engine.on_pointer_up(*at, Button::Primary, none, now));
                actions
            }
            Step::Layer(name, visible) => self.engine.toggle_layer(name, *visible)?,
        };
        self.handle(actions);
        Ok(())
    }

    /// Paint pending frames and fire due timers until nothing is scheduled.
    pub fn settle(&mut self) -> Result<(), HostError> {
        for _ in 0..MAX_SETTLE_STEPS {
            if self.engine.is_render_pending() {
                let actions = self.engine.on_frame(self.now)?;
                self.handle(actions);
                if self.engine.is_transitioning() {
                    self.now += FRAME;
                }
                continue;
            }
            let Some(at) = self.engine.next_deadline() else {
                return Ok(());
            };
            self.now = self.now.max(at);
            let actions = self.engine.tick(self.now);
            self.handle(actions);
        }
        Err(HostError::Unsettled(MAX_SETTLE_STEPS))
    }

    fn handle(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::ReadoutShown(r) => {
                    tracing::info!(readout = %r, "readout");
                    self.last_readout = Some(r);
                }
                Action::ReadoutHidden => tracing::debug!("readout hidden"),
                Action::StrokeWidthChanged(width) => tracing::debug!(width, "stroke floor published"),
                Action::LayersChanged => tracing::debug!(layers = self.engine.layers().len(), "layers changed"),
                Action::RenderNeeded => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
