//! Backend contract.
//!
//! Defines the narrow procedural interface gembed consumes: a single batch
//! call taking borrowed text views and handing back a flat float buffer, and
//! a release call for that buffer.

use std::fmt;
use std::marker::PhantomData;

use crate::error::BackendError;

/// Identifier of a validated embedding method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub u32);

/// Identifier of a validated model within a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

/// Non-owning `(pointer, length)` view into caller-owned text.
///
/// Laid out like the backend's C `StringSlice` so a slice of these can be
/// handed across the boundary without copying.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct StringSlice<'a> {
    ptr: *const u8,
    len: usize,
    _marker: PhantomData<&'a str>,
}

impl<'a> StringSlice<'a> {
    /// Borrow `text` as a slice.
    pub fn new(text: &'a str) -> Self {
        Self {
            ptr: text.as_ptr(),
            len: text.len(),
            _marker: PhantomData,
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The viewed text.
    pub fn as_str(&self) -> &'a str {
        // SAFETY: ptr/len were taken from a &'a str in `new` and the marker
        // keeps that borrow alive for 'a.
        unsafe {
            std::str::from_utf8_unchecked(std::slice::from_raw_parts(self.ptr, self.len))
        }
    }
}

impl<'a> From<&'a str> for StringSlice<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text)
    }
}

impl fmt::Debug for StringSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StringSlice").field(&self.as_str()).finish()
    }
}

/// Read access to a batch of vectors produced by one backend call.
pub trait BatchView {
    /// Number of vectors in the batch.
    fn n_vectors(&self) -> usize;

    /// Dimension of every vector.
    fn dim(&self) -> usize;

    /// Flat row-major buffer of `n_vectors * dim` floats.
    fn data(&self) -> &[f32];
}

/// The batch embedding backend.
///
/// Each logical request makes exactly one `generate` call. Whatever batch the
/// backend hands back, on success or failure, must go back through `release`
/// exactly once.
pub trait EmbeddingBackend {
    /// Backend-owned batch storage.
    type Batch: BatchView;

    /// Embed every input in one call.
    ///
    /// Returns the raw status (0 = success, anything else = failure code)
    /// and the batch the backend allocated, if any. The backend may allocate
    /// output storage even when it fails.
    fn generate(
        &self,
        method: MethodId,
        model: ModelId,
        inputs: &[StringSlice<'_>],
    ) -> (i32, Option<Self::Batch>);

    /// Return a batch to the backend.
    fn release(&self, batch: Self::Batch);
}

/// Map a raw backend status to a result.
pub fn check_status(status: i32) -> Result<(), BackendError> {
    if status == 0 {
        Ok(())
    } else {
        Err(BackendError::Status(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_slice_views_text() {
        let owned = String::from("hello world");
        let slice = StringSlice::new(&owned[6..]);
        assert_eq!(slice.as_str(), "world");
        assert_eq!(slice.len(), 5);
        assert!(!slice.is_empty());
    }

    #[test]
    fn test_string_slice_empty() {
        let slice = StringSlice::from("");
        assert!(slice.is_empty());
        assert_eq!(slice.as_str(), "");
    }

    #[test]
    fn test_string_slice_layout() {
        assert_eq!(
            std::mem::size_of::<StringSlice<'_>>(),
            std::mem::size_of::<usize>() * 2
        );
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(0).is_ok());
        assert!(matches!(check_status(-1), Err(BackendError::Status(-1))));
        assert!(matches!(check_status(2), Err(BackendError::Status(2))));
    }
}
