//! Backend invocation.
//!
//! Makes the single backend call for a request and takes ownership of
//! whatever batch comes back. Any failure after the call drops the handle,
//! which returns the batch to the backend before the error propagates.

use tracing::{debug, warn};

use gembed_backend::{check_status, BatchHandle, EmbeddingBackend};

use crate::assemble::EmbeddingRequest;
use crate::error::GembedError;

/// Call the backend once for `request`.
///
/// Consumes the request so it cannot be submitted twice. On success the
/// batch holds exactly one vector per input, in input order.
pub fn invoke<'b, B: EmbeddingBackend + ?Sized>(
    backend: &'b B,
    request: EmbeddingRequest<'_>,
) -> Result<BatchHandle<'b, B>, GembedError> {
    let call = request.call();
    let expected = request.len();

    debug!(
        method_id = call.method.0,
        model_id = call.model.0,
        count = expected,
        "Invoking embedding backend"
    );

    let (status, batch) = backend.generate(call.method, call.model, request.slices());
    let handle = batch.map(|b| BatchHandle::new(backend, b));

    if let Err(e) = check_status(status) {
        warn!(code = status, count = expected, "Embedding backend failed");
        drop(handle);
        return Err(e.into());
    }

    let handle = handle.ok_or(GembedError::BatchShape {
        expected,
        n_vectors: 0,
        dim: 0,
        len: 0,
    })?;

    if handle.n_vectors() != expected || !handle.is_well_formed() {
        warn!(
            expected,
            n_vectors = handle.n_vectors(),
            dim = handle.dim(),
            len = handle.data().len(),
            "Embedding batch does not match request"
        );
        return Err(GembedError::BatchShape {
            expected,
            n_vectors: handle.n_vectors(),
            dim: handle.dim(),
            len: handle.data().len(),
        });
    }

    debug!(
        n_vectors = handle.n_vectors(),
        dim = handle.dim(),
        "Embedding batch received"
    );
    Ok(handle)
}
