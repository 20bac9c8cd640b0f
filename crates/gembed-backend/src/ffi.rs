//! Native backend bindings.
//!
//! Raw `extern "C"` declarations for the embedding backend library and a
//! safe `NativeBackend` wrapper implementing the catalog and backend traits.
//!
//! # Safety
//!
//! All extern functions are unsafe. `NativeBackend` upholds their contracts:
//! names are passed as NUL-terminated strings, inputs as `StringSlice`s that
//! outlive the call, and every batch goes back through
//! `free_embedding_batch` exactly once (via `BatchHandle`).

use std::ffi::CString;
use std::os::raw::{c_char, c_float, c_int};

use tracing::warn;

use gembed_types::{CatalogSettings, InputKind};

use crate::catalog::CapabilityCatalog;
use crate::contract::{BatchView, EmbeddingBackend, MethodId, ModelId, StringSlice};

/// Batch layout shared with the native backend.
#[repr(C)]
#[derive(Debug)]
pub struct EmbeddingBatch {
    pub data: *mut c_float,
    pub n_vectors: usize,
    pub dim: usize,
}

impl EmbeddingBatch {
    fn empty() -> Self {
        Self {
            data: std::ptr::null_mut(),
            n_vectors: 0,
            dim: 0,
        }
    }
}

impl BatchView for EmbeddingBatch {
    fn n_vectors(&self) -> usize {
        self.n_vectors
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn data(&self) -> &[f32] {
        if self.data.is_null() {
            return &[];
        }
        match self.n_vectors.checked_mul(self.dim) {
            // SAFETY: the backend allocates n_vectors * dim floats at `data`
            // and keeps them alive until free_embedding_batch.
            Some(len) => unsafe { std::slice::from_raw_parts(self.data, len) },
            None => &[],
        }
    }
}

#[link(name = "gembed_backend")]
extern "C" {
    /// Returns the method id, or a negative value for unknown methods.
    pub fn validate_embedding_method(method: *const c_char) -> c_int;

    /// Returns the model id, or a negative value if the model is not allowed.
    pub fn validate_embedding_model(
        method_id: c_int,
        model: *const c_char,
        input_type: c_int,
    ) -> c_int;

    /// Embed `n_inputs` texts into `out_batch`.
    ///
    /// Returns 0 on success. `out_batch` may be populated on failure too.
    pub fn generate_embeddings_from_texts(
        method_id: c_int,
        model_id: c_int,
        inputs: *const StringSlice<'static>,
        n_inputs: usize,
        out_batch: *mut EmbeddingBatch,
    ) -> c_int;

    /// Free storage allocated by `generate_embeddings_from_texts`.
    pub fn free_embedding_batch(batch: *mut EmbeddingBatch);
}

/// Backend implemented by the native library.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }
}

fn to_id(raw: c_int) -> Option<u32> {
    u32::try_from(raw).ok()
}

impl CapabilityCatalog for NativeBackend {
    fn method_id(&self, name: &str) -> Option<MethodId> {
        let name = CString::new(name).ok()?;
        // SAFETY: name is a valid NUL-terminated string for the call.
        let raw = unsafe { validate_embedding_method(name.as_ptr()) };
        to_id(raw).map(MethodId)
    }

    fn model_id(&self, method: MethodId, name: &str, kind: InputKind) -> Option<ModelId> {
        let name = CString::new(name).ok()?;
        let method_id = c_int::try_from(method.0).ok()?;
        // SAFETY: name is a valid NUL-terminated string for the call.
        let raw = unsafe { validate_embedding_model(method_id, name.as_ptr(), kind.as_raw()) };
        to_id(raw).map(ModelId)
    }

    fn method_names(&self) -> Vec<String> {
        CatalogSettings::default()
            .method_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

impl EmbeddingBackend for NativeBackend {
    type Batch = EmbeddingBatch;

    fn generate(
        &self,
        method: MethodId,
        model: ModelId,
        inputs: &[StringSlice<'_>],
    ) -> (i32, Option<EmbeddingBatch>) {
        let (Ok(method_id), Ok(model_id)) = (c_int::try_from(method.0), c_int::try_from(model.0))
        else {
            warn!(method = method.0, model = model.0, "Backend id out of range");
            return (-1, None);
        };

        let mut batch = EmbeddingBatch::empty();
        // SAFETY: inputs is a live slice of repr(C) StringSlice views whose
        // texts outlive this call; batch is a valid out pointer.
        let status = unsafe {
            generate_embeddings_from_texts(
                method_id,
                model_id,
                inputs.as_ptr().cast(),
                inputs.len(),
                &mut batch,
            )
        };
        (status, Some(batch))
    }

    fn release(&self, mut batch: EmbeddingBatch) {
        // SAFETY: batch came from generate_embeddings_from_texts and is
        // released once; the backend accepts zeroed batches.
        unsafe { free_embedding_batch(&mut batch) };
    }
}
