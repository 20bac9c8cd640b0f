//! Batch assembly.
//!
//! Turns the caller's nullable collections into one ordered request of
//! borrowed text views. Position is the only key linking texts, ids and
//! output vectors, so nothing here reorders.

use tracing::debug;

use gembed_backend::StringSlice;

use crate::error::GembedError;
use crate::validate::ValidatedCall;

/// One validated, assembled request, ready for a single backend call.
///
/// Borrows the caller's texts; it cannot outlive the invocation that built it.
#[derive(Debug)]
pub struct EmbeddingRequest<'a> {
    call: ValidatedCall,
    slices: Vec<StringSlice<'a>>,
}

impl<'a> EmbeddingRequest<'a> {
    pub fn call(&self) -> ValidatedCall {
        self.call
    }

    pub fn slices(&self) -> &[StringSlice<'a>] {
        &self.slices
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Request plus the identifiers paired with each text by position.
#[derive(Debug)]
pub struct IdentifiedRequest<'a> {
    pub ids: Vec<i32>,
    pub request: EmbeddingRequest<'a>,
}

fn text_slices<'a, S: AsRef<str>>(
    texts: &'a [Option<S>],
) -> Result<Vec<StringSlice<'a>>, GembedError> {
    texts
        .iter()
        .enumerate()
        .map(|(position, text)| {
            text.as_ref()
                .map(|t| StringSlice::new(t.as_ref()))
                .ok_or(GembedError::NullNotAllowed { position })
        })
        .collect()
}

/// Assemble texts alone.
///
/// Returns `None` for an empty collection: nothing to embed, not an error.
pub fn assemble_texts<'a, S: AsRef<str>>(
    call: ValidatedCall,
    texts: &'a [Option<S>],
) -> Result<Option<EmbeddingRequest<'a>>, GembedError> {
    if texts.is_empty() {
        debug!("Empty text collection, nothing to embed");
        return Ok(None);
    }

    let slices = text_slices(texts)?;
    debug!(count = slices.len(), "Assembled embedding batch");
    Ok(Some(EmbeddingRequest { call, slices }))
}

/// Assemble texts with parallel identifiers.
///
/// Cardinalities must match and no element of either collection may be null.
/// All checks run before the backend sees anything.
pub fn assemble_with_ids<'a, S: AsRef<str>>(
    call: ValidatedCall,
    ids: &[Option<i32>],
    texts: &'a [Option<S>],
) -> Result<Option<IdentifiedRequest<'a>>, GembedError> {
    if ids.len() != texts.len() {
        return Err(GembedError::ArityMismatch {
            ids: ids.len(),
            texts: texts.len(),
        });
    }

    if ids.is_empty() {
        debug!("Empty id/text collections, nothing to embed");
        return Ok(None);
    }

    // Row by row, so the first row holding a null is the one reported
    let (ids, slices): (Vec<i32>, Vec<StringSlice<'a>>) = ids
        .iter()
        .zip(texts)
        .enumerate()
        .map(|(position, row)| match row {
            (Some(id), Some(text)) => Ok((*id, StringSlice::new(text.as_ref()))),
            _ => Err(GembedError::NullNotAllowed { position }),
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .unzip();

    debug!(count = slices.len(), "Assembled identified embedding batch");
    Ok(Some(IdentifiedRequest {
        ids,
        request: EmbeddingRequest { call, slices },
    }))
}
