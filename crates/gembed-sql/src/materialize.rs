//! Copy a backend batch into host vectors.

use tracing::debug;

use gembed_backend::{BatchHandle, EmbeddingBackend};

use crate::error::GembedError;
use crate::vector::Vector;

/// Copy every vector out of `batch`, in order, then release the batch.
///
/// If any vector is rejected the vectors built so far are dropped along with
/// the batch; nothing partial is returned.
pub fn materialize<B: EmbeddingBackend + ?Sized>(
    batch: BatchHandle<'_, B>,
) -> Result<Vec<Vector>, GembedError> {
    let vectors = batch
        .vectors()
        .map(Vector::from_slice)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = vectors.len(), dim = batch.dim(), "Materialized embeddings");
    Ok(vectors)
}
