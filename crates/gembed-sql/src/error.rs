//! Error types for the embedding functions.

use gembed_backend::BackendError;
use thiserror::Error;

/// Errors that abort a logical request.
///
/// None are retried; every variant ends the request that raised it.
#[derive(Debug, Error, PartialEq)]
pub enum GembedError {
    /// Method name not in the capability catalog
    #[error("Invalid embedding method: {method} (use {hint})")]
    InvalidMethod { method: String, hint: String },

    /// Model not allowed for the method and input kind
    #[error("Model not allowed: {0}")]
    ModelNotAllowed(String),

    /// Identifier and text collections differ in length
    #[error("ids and texts arrays must have same length (ids={ids}, texts={texts})")]
    ArityMismatch { ids: usize, texts: usize },

    /// Null element in an input collection
    #[error("NULL values not allowed (position {position})")]
    NullNotAllowed { position: usize },

    /// Backend reported a non-zero status
    #[error("embedding generation failed (code={code})")]
    Backend { code: i32 },

    /// Backend returned a batch that does not match the request
    #[error(
        "backend returned {n_vectors} vectors of dimension {dim} in {len} floats for {expected} inputs"
    )]
    BatchShape {
        expected: usize,
        n_vectors: usize,
        dim: usize,
        len: usize,
    },

    /// Vector cannot be represented by the vector type
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Catalog could not be built
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<BackendError> for GembedError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Status(code) => GembedError::Backend { code },
            BackendError::Catalog(e) => GembedError::Config(e.to_string()),
        }
    }
}
