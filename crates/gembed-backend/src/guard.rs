//! Scoped ownership of backend batches.
//!
//! A `BatchHandle` owns one batch handed back by the backend and returns it
//! through `EmbeddingBackend::release` when dropped. Every exit path, success
//! or error, releases the batch exactly once.

use std::fmt;

use tracing::trace;

use crate::contract::{BatchView, EmbeddingBackend};

/// RAII owner of a backend batch.
pub struct BatchHandle<'b, B: EmbeddingBackend + ?Sized> {
    backend: &'b B,
    batch: Option<B::Batch>,
}

impl<'b, B: EmbeddingBackend + ?Sized> BatchHandle<'b, B> {
    /// Take ownership of `batch`; it goes back to `backend` on drop.
    pub fn new(backend: &'b B, batch: B::Batch) -> Self {
        Self {
            backend,
            batch: Some(batch),
        }
    }

    fn view(&self) -> Option<&B::Batch> {
        self.batch.as_ref()
    }

    pub fn n_vectors(&self) -> usize {
        self.view().map_or(0, |b| b.n_vectors())
    }

    pub fn dim(&self) -> usize {
        self.view().map_or(0, |b| b.dim())
    }

    /// Flat buffer as reported by the backend.
    pub fn data(&self) -> &[f32] {
        self.view().map(|b| b.data()).unwrap_or(&[])
    }

    /// Whether the buffer holds exactly `n_vectors * dim` floats.
    pub fn is_well_formed(&self) -> bool {
        self.n_vectors()
            .checked_mul(self.dim())
            .is_some_and(|expected| expected == self.data().len())
    }

    /// Vectors in batch order.
    ///
    /// Stops early rather than reading past the buffer if the batch is not
    /// well formed.
    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> + '_ {
        let dim = self.dim();
        let data = self.data();
        (0..self.n_vectors()).map_while(move |i| data.get(i * dim..(i + 1) * dim))
    }
}

impl<B: EmbeddingBackend + ?Sized> Drop for BatchHandle<'_, B> {
    fn drop(&mut self) {
        if let Some(batch) = self.batch.take() {
            trace!(n_vectors = batch.n_vectors(), "Releasing embedding batch");
            self.backend.release(batch);
        }
    }
}

impl<B: EmbeddingBackend + ?Sized> fmt::Debug for BatchHandle<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchHandle")
            .field("n_vectors", &self.n_vectors())
            .field("dim", &self.dim())
            .finish()
    }
}
