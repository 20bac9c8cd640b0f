//! Streaming cursor for id-paired embeddings.
//!
//! The cursor is built once, on the first invocation, from the backend batch
//! and the caller's ids. Each later invocation replays one entry by index. It
//! never calls the backend and never reorders.
//!
//! States: `Active(position)` for `position` in `0..=nitems`, then
//! `Terminated`. A cursor built from zero inputs starts out terminated.

use tracing::debug;

use gembed_backend::{BatchHandle, EmbeddingBackend};

use crate::error::GembedError;
use crate::vector::Vector;

/// One caller id paired with its vector. Owns its vector storage.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifiedVector {
    pub id: i32,
    pub vector: Vector,
}

/// One output row: `(sentence_id int4, embedding vector)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRow {
    pub sentence_id: i32,
    pub embedding: Vector,
}

impl EmbeddingRow {
    /// Output columns as `(name, type)`.
    pub const COLUMNS: [(&'static str, &'static str); 2] =
        [("sentence_id", "int4"), ("embedding", "vector")];
}

impl From<IdentifiedVector> for EmbeddingRow {
    fn from(entry: IdentifiedVector) -> Self {
        Self {
            sentence_id: entry.id,
            embedding: entry.vector,
        }
    }
}

#[derive(Debug)]
enum CursorState {
    Active {
        entries: std::vec::IntoIter<IdentifiedVector>,
        position: usize,
    },
    Terminated,
}

/// Resumable producer over a materialized sequence of id/vector pairs.
#[derive(Debug)]
pub struct EmbeddingCursor {
    state: CursorState,
    nitems: usize,
}

impl EmbeddingCursor {
    /// Cursor with nothing to emit.
    pub fn empty() -> Self {
        Self {
            state: CursorState::Terminated,
            nitems: 0,
        }
    }

    /// Pair `ids` with the vectors of `batch`, then release the batch.
    ///
    /// `ids[i]` is paired with vector `i`; the counts must agree.
    pub fn build<B: EmbeddingBackend + ?Sized>(
        ids: Vec<i32>,
        batch: BatchHandle<'_, B>,
    ) -> Result<Self, GembedError> {
        if ids.len() != batch.n_vectors() {
            return Err(GembedError::BatchShape {
                expected: ids.len(),
                n_vectors: batch.n_vectors(),
                dim: batch.dim(),
                len: batch.data().len(),
            });
        }

        let entries = ids
            .into_iter()
            .zip(batch.vectors())
            .map(|(id, values)| {
                Ok(IdentifiedVector {
                    id,
                    vector: Vector::from_slice(values)?,
                })
            })
            .collect::<Result<Vec<_>, GembedError>>()?;

        let nitems = entries.len();
        debug!(nitems, dim = batch.dim(), "Embedding cursor ready");

        Ok(Self {
            state: CursorState::Active {
                entries: entries.into_iter(),
                position: 0,
            },
            nitems,
        })
    }

    /// Total rows the cursor emits.
    pub fn nitems(&self) -> usize {
        self.nitems
    }

    /// Rows emitted so far.
    pub fn position(&self) -> usize {
        match &self.state {
            CursorState::Active { position, .. } => *position,
            CursorState::Terminated => self.nitems,
        }
    }

    /// Rows not yet emitted. Emitted rows are no longer held by the cursor.
    pub fn remaining(&self) -> usize {
        match &self.state {
            CursorState::Active { entries, .. } => entries.len(),
            CursorState::Terminated => 0,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, CursorState::Terminated)
    }

    /// Hand out the row at the current position and advance.
    ///
    /// Returns `None` once every row has been emitted; the cursor moves to
    /// `Terminated` at that point and every later call returns `None`.
    pub fn next_row(&mut self) -> Option<EmbeddingRow> {
        if let CursorState::Active { entries, position } = &mut self.state {
            if let Some(entry) = entries.next() {
                *position += 1;
                return Some(entry.into());
            }
            debug!(nitems = self.nitems, "Embedding cursor exhausted");
            self.state = CursorState::Terminated;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gembed_backend::{MethodId, ModelId, StringSlice, TrackingBackend};

    fn cursor(backend: &TrackingBackend, ids: Vec<i32>, texts: &[&str]) -> EmbeddingCursor {
        let slices: Vec<StringSlice<'_>> = texts.iter().copied().map(StringSlice::new).collect();
        let (_, batch) = backend.generate(MethodId(0), ModelId(0), &slices);
        EmbeddingCursor::build(ids, BatchHandle::new(backend, batch.unwrap())).unwrap()
    }

    #[test]
    fn test_replays_in_order() {
        let backend = TrackingBackend::with_vectors(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
        let mut cursor = cursor(&backend, vec![7, 9], &["a", "b"]);
        assert_eq!(backend.outstanding(), 0);
        assert_eq!(cursor.nitems(), 2);
        assert_eq!(cursor.position(), 0);

        let first = cursor.next_row().unwrap();
        assert_eq!(first.sentence_id, 7);
        assert_eq!(first.embedding.as_slice(), &[1.0, 0.0, 0.0]);
        assert_eq!(cursor.position(), 1);

        let second = cursor.next_row().unwrap();
        assert_eq!(second.sentence_id, 9);
        assert_eq!(second.embedding.as_slice(), &[0.0, 1.0, 0.0]);
        assert!(!cursor.is_terminated());

        assert!(cursor.next_row().is_none());
        assert!(cursor.is_terminated());
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_emitted_rows_leave_the_cursor() {
        let backend = TrackingBackend::new(4);
        let mut cursor = cursor(&backend, vec![1, 2, 3], &["a", "b", "c"]);
        assert_eq!(cursor.remaining(), 3);

        let first = cursor.next_row().unwrap();
        assert_eq!(first.embedding.as_slice(), TrackingBackend::fingerprint("a", 4).as_slice());
        assert_eq!(cursor.remaining(), 2);

        cursor.next_row().unwrap();
        cursor.next_row().unwrap();
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.position(), 3);
        assert!(cursor.next_row().is_none());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_terminated_stays_terminated() {
        let backend = TrackingBackend::new(2);
        let mut cursor = cursor(&backend, vec![1], &["x"]);
        assert!(cursor.next_row().is_some());
        for _ in 0..3 {
            assert!(cursor.next_row().is_none());
        }
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_empty_cursor() {
        let mut cursor = EmbeddingCursor::empty();
        assert!(cursor.is_terminated());
        assert_eq!(cursor.nitems(), 0);
        assert!(cursor.next_row().is_none());
    }

    #[test]
    fn test_id_count_mismatch_releases_batch() {
        let backend = TrackingBackend::new(2);
        let slices = vec![StringSlice::new("a"), StringSlice::new("b")];
        let (_, batch) = backend.generate(MethodId(0), ModelId(0), &slices);
        let result = EmbeddingCursor::build(vec![1], BatchHandle::new(&backend, batch.unwrap()));
        assert!(matches!(result, Err(GembedError::BatchShape { .. })));
        assert_eq!(backend.outstanding(), 0);
    }

    #[test]
    fn test_columns() {
        assert_eq!(EmbeddingRow::COLUMNS[0], ("sentence_id", "int4"));
        assert_eq!(EmbeddingRow::COLUMNS[1], ("embedding", "vector"));
    }
}
