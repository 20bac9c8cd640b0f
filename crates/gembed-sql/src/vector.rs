//! Host vector value type.
//!
//! Mirrors the engine's `vector` column type: a dimension header followed by
//! `dim` single-precision floats.

use std::fmt;

use crate::error::GembedError;

/// Largest dimension the vector type stores.
pub const VECTOR_MAX_DIM: usize = 16000;

/// Bytes preceding the payload (length word, dim, unused).
pub const VECTOR_HEADER_SIZE: usize = 8;

/// A fixed-dimension float vector owned by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    values: Vec<f32>,
}

impl Vector {
    /// Build a vector, checking dimension bounds and element finiteness.
    pub fn new(values: Vec<f32>) -> Result<Self, GembedError> {
        if values.is_empty() {
            return Err(GembedError::InvalidVector(
                "vector must have at least 1 dimension".to_string(),
            ));
        }
        if values.len() > VECTOR_MAX_DIM {
            return Err(GembedError::InvalidVector(format!(
                "vector cannot have more than {} dimensions, got {}",
                VECTOR_MAX_DIM,
                values.len()
            )));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(GembedError::InvalidVector(format!(
                "non-finite value {} at position {}",
                values[pos], pos
            )));
        }
        Ok(Self { values })
    }

    /// Copy a vector out of a borrowed buffer.
    pub fn from_slice(values: &[f32]) -> Result<Self, GembedError> {
        Self::new(values.to_vec())
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }

    /// Stored size in bytes, header included.
    pub fn storage_size(&self) -> usize {
        VECTOR_HEADER_SIZE + std::mem::size_of::<f32>() * self.dim()
    }
}

/// Text form used by the engine: `[1,0.5,-2]`.
impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", v)?;
        }
        f.write_str("]")
    }
}
