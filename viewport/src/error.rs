//! Error taxonomy for the viewport engine.
//!
//! Out-of-bounds zoom is not represented here: the transform model clamps it.

/// Malformed drawing input. A load that fails with this leaves the previous
/// drawing in place.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The markup is not well-formed XML.
    #[error("malformed drawing markup: {0}")]
    Xml(#[from] roxmltree::Error),
    /// The document root is not an `<svg>` element.
    #[error("drawing root must be <svg>, found <{0}>")]
    NotSvg(String),
    /// The rasterizer could not build a render tree from the markup.
    #[error("rasterizer rejected drawing: {0}")]
    Rasterize(#[from] resvg::usvg::Error),
    /// The offscreen raster could not be allocated.
    #[error("cannot allocate {width}x{height} raster")]
    RasterSize { width: u32, height: u32 },
}

/// Painting failed; the previous frame stays current.
#[derive(Debug, thiserror::Error)]
#[error("render failed: {0}")]
pub struct RenderError(#[from] pub ParseError);

/// A single metadata entry that could not be used. Never fatal to a load.
#[derive(Debug, thiserror::Error)]
pub enum MetadataDecodeError {
    /// A `<text>` entry carries no `id` to key it by.
    #[error("metadata entry #{index} has no id")]
    MissingId { index: usize },
    /// The layer table entry is not a list of layer records.
    #[error("layer table `{key}` is malformed: {source}")]
    LayerTable {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Fetching drawing content failed before it reached the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("fetch of {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    /// The request never produced a response.
    #[error("fetch of {url} failed: {message}")]
    Transport { url: String, message: String },
    /// A local file could not be read.
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
}

/// Errors surfaced to the host by [`crate::engine::Engine`].
#[derive(Debug, thiserror::Error)]
pub enum ViewportError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
    /// A toggle named a layer the registry does not contain.
    #[error("unknown layer: {0}")]
    UnknownLayer(String),
}
