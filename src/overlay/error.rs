//! Overlay error types.
//!
//! A missing asset is not an error: the resolver reports it as `None` and
//! the builder skips the layer. Everything here is fatal for one render.

use std::fmt;

/// Errors raised by the asset resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// Brand record lacks a usable identity field
    MalformedBrand(String),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedBrand(msg) => write!(f, "Malformed brand: {}", msg),
        }
    }
}

impl std::error::Error for AssetError {}

/// Errors returned by `PipelineBuilder::build`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("invalid frame dimensions {width}x{height}: both must be positive")]
    InvalidFrame { width: u32, height: u32 },

    #[error(
        "pipeline has {found} terminal labels (expected 1) after layers [{}]",
        .attempted.join(", ")
    )]
    TerminalCount { found: usize, attempted: Vec<String> },

    #[error("layer stage '{stage}' failed: {reason}")]
    Stage { stage: String, reason: String },
}
