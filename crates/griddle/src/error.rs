//! # Errors
//!
//! Every fallible operation in griddle returns [`GenerationError`]. Errors are
//! surfaced to the immediate caller; the generation loop never retries, skips
//! or substitutes a failed step.

use std::fmt;
use thiserror::Error;

/// Error type returned by a model collaborator's `forward` pass.
///
/// Models are free to use any error type, they only need to box it.
pub type ForwardError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// The model component that failed during a forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The image encoder
    ImageEncoder,
    /// The text encoder
    TextEncoder,
    /// The autoregressive decoder
    Decoder,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ImageEncoder => write!(f, "image encoder"),
            Stage::TextEncoder => write!(f, "text encoder"),
            Stage::Decoder => write!(f, "decoder"),
        }
    }
}

/// Errors that can occur while encoding inputs or running the generation loop.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Required inputs are missing or inconsistent. Raised before any forward pass runs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A model collaborator failed while running a forward pass.
    #[error("{stage} forward pass failed: {source}")]
    ForwardPass {
        /// Which component failed
        stage: Stage,
        /// The error reported by the model
        #[source]
        source: ForwardError,
    },

    /// A tensor did not have the shape an operation required.
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// Conversion to or from a tensor runtime failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// Reading a configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerationError {
    pub(crate) fn forward(stage: Stage, source: ForwardError) -> Self {
        GenerationError::ForwardPass { stage, source }
    }

    /// True if this error was raised before any model was invoked.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GenerationError::Configuration(_))
    }
}
