//! Interactive viewport engine for vector floor plans and CAD exports.
//!
//! The engine owns a parsed drawing, a pan/zoom transform, the named layers
//! the drawing is grouped into, and an adaptive stroke-width floor that keeps
//! thin lines legible at any zoom. It is host-driven: the host forwards input
//! events and the current time, and acts on the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`], loads, commands, and timers |
//! | [`camera`] | Transform model, zoom profiles, and animated transitions |
//! | [`surface`] | The [`surface::DrawingSurface`] contract and shared types |
//! | [`live`] | Retained-markup surface |
//! | [`raster`] | Offscreen-raster surface |
//! | [`doc`] | Owned, mutable SVG document tree and layer indexing |
//! | [`layers`] | Layer registry |
//! | [`stroke`] | Stroke-width floor controller |
//! | [`inspector`] | Click-to-world readout |
//! | [`metadata`] | Embedded metadata extraction |
//! | [`input`] | Input event types and the pointer gesture state |
//! | [`timer`] | Cancelable host-polled debounce |
//! | [`error`] | Error types |
//! | [`consts`] | Shared constants (zoom limits, timings, attribute names) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod input;
pub mod inspector;
pub mod layers;
pub mod live;
pub mod metadata;
pub mod raster;
pub mod stroke;
pub mod surface;
pub mod timer;

pub use engine::{Action, DrawingPayload, Engine, EngineConfig, LoadOutcome, LoadTicket};
pub use error::{FetchError, ParseError, RenderError, ViewportError};
pub use surface::{SurfaceKind, SurfaceOutput, Viewport};
