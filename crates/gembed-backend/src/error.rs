//! Backend error types.

use gembed_types::ConfigError;
use thiserror::Error;

/// Errors raised at the backend boundary.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend reported a non-zero status
    #[error("embedding generation failed (code={0})")]
    Status(i32),

    /// Catalog could not be built from settings
    #[error("Catalog error: {0}")]
    Catalog(#[from] ConfigError),
}
