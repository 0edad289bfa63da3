//! Host configuration parsed from environment variables.

use viewport::SurfaceKind;

use crate::error::HostError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Backend that drawing paths are resolved against.
    pub base_url: String,
    pub surface: SurfaceKind,
    pub timeouts: FetchTimeouts,
}

impl HostConfig {
    /// Build typed host config from environment variables.
    ///
    /// Optional:
    /// - `PLANVIEW_BASE_URL`: default `http://localhost:5000`
    /// - `PLANVIEW_SURFACE`: `live` (default) or `raster`
    /// - `PLANVIEW_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PLANVIEW_CONNECT_TIMEOUT_SECS`: default 10
    pub fn from_env() -> Result<Self, HostError> {
        let base_url = std::env::var("PLANVIEW_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let surface = parse_surface(std::env::var("PLANVIEW_SURFACE").ok().as_deref())?;
        let timeouts = FetchTimeouts {
            request_secs: env_parse_u64("PLANVIEW_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("PLANVIEW_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self { base_url: normalize_base_url(&base_url), surface, timeouts })
    }

    /// Apply command-line overrides on top of the environment.
    #[must_use]
    pub fn with_overrides(mut self, base_url: Option<&str>, surface: Option<SurfaceKind>) -> Self {
        if let Some(url) = base_url {
            self.base_url = normalize_base_url(url);
        }
        if let Some(kind) = surface {
            self.surface = kind;
        }
        self
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key).map(|v| v.trim().parse::<u64>()) {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => {
            tracing::warn!(key, error = %e, default, "ignoring unparsable env value");
            default
        }
        Err(_) => default,
    }
}

fn parse_surface(raw: Option<&str>) -> Result<SurfaceKind, HostError> {
    raw.unwrap_or("live").parse().map_err(|e: String| HostError::ConfigParse(format!("PLANVIEW_SURFACE: {e}")))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
