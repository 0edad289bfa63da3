//! Host-level errors. Engine errors pass through unchanged.

use viewport::{FetchError, RenderError, ViewportError};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Viewport(#[from] ViewportError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// Simulated time did not settle; a timer kept rescheduling itself.
    #[error("engine did not settle after {0} steps")]
    Unsettled(usize),

    /// The loaded drawing produced no output to write.
    #[error("nothing rendered")]
    NothingRendered,

    #[error("PNG encoding failed: {0}")]
    Png(String),

    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
