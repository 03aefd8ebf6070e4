//! Error types for setup paths.
//!
//! Per-frame numeric and geometric failures are not errors: they surface as
//! `None` from `Matrix4::inverse`, `project` and picking.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Axis name other than x / y / z
    #[error("invalid rotation axis `{0}` (expected x, y or z)")]
    InvalidAxis(String),

    /// Zero-sized raster target
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: usize, height: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
