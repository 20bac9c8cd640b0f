//! Allocation-tracking backend for testing.
//!
//! `TrackingBackend` records every call and every batch it allocates and
//! releases, so tests can assert that a request called the backend exactly
//! once and left no batch behind.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use crate::contract::{BatchView, EmbeddingBackend, MethodId, ModelId, StringSlice};

/// Scripted behaviour for the next calls to a `TrackingBackend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Script {
    /// Embed every input
    #[default]
    Succeed,
    /// Report `status`, optionally still handing back an allocated batch
    Fail { status: i32, with_batch: bool },
    /// Return one vector more than requested
    ExtraVector,
    /// Return a buffer one float short
    TruncateData,
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: MethodId,
    pub model: ModelId,
    pub texts: Vec<String>,
}

/// Batch allocated by a `TrackingBackend`.
#[derive(Debug)]
pub struct MockBatch {
    id: u64,
    data: Vec<f32>,
    n_vectors: usize,
    dim: usize,
}

impl BatchView for MockBatch {
    fn n_vectors(&self) -> usize {
        self.n_vectors
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn data(&self) -> &[f32] {
        &self.data
    }
}

#[derive(Debug, Default)]
struct State {
    script: Script,
    calls: Vec<RecordedCall>,
    next_id: u64,
    live: HashSet<u64>,
    allocated: usize,
    released: usize,
    unknown_releases: usize,
}

/// Deterministic backend double that tracks batch ownership.
#[derive(Debug)]
pub struct TrackingBackend {
    dim: usize,
    rows: Option<Vec<Vec<f32>>>,
    state: Mutex<State>,
}

impl TrackingBackend {
    /// Backend producing `dim`-dimensional fingerprints of each input.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            rows: None,
            state: Mutex::new(State::default()),
        }
    }

    /// Backend returning `rows` in order (cycled if there are more inputs).
    pub fn with_vectors(rows: Vec<Vec<f32>>) -> Self {
        let dim = rows.first().map_or(0, Vec::len);
        Self {
            dim,
            rows: Some(rows),
            state: Mutex::new(State::default()),
        }
    }

    /// Vector the fingerprinting backend produces for `text`.
    pub fn fingerprint(text: &str, dim: usize) -> Vec<f32> {
        // FNV-1a over the text, then one mixed value per component
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        (0..dim)
            .map(|j| {
                let mixed = (hash ^ (j as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15))
                    .wrapping_mul(0xbf58_476d_1ce4_e5b9);
                ((mixed >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
            })
            .collect()
    }

    /// Set the behaviour for subsequent calls.
    pub fn script(&self, script: Script) {
        self.lock().script = script;
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Batches handed out so far.
    pub fn allocated(&self) -> usize {
        self.lock().allocated
    }

    /// Batches returned so far.
    pub fn released(&self) -> usize {
        self.lock().released
    }

    /// Batches handed out and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.lock().live.len()
    }

    /// Releases of batches this backend never handed out (or already got back).
    pub fn unknown_releases(&self) -> usize {
        self.lock().unknown_releases
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn row(&self, index: usize, text: &str) -> Vec<f32> {
        match &self.rows {
            Some(rows) if !rows.is_empty() => rows[index % rows.len()].clone(),
            Some(_) => Vec::new(),
            None => Self::fingerprint(text, self.dim),
        }
    }

    fn allocate(state: &mut State, data: Vec<f32>, n_vectors: usize, dim: usize) -> MockBatch {
        let id = state.next_id;
        state.next_id += 1;
        state.allocated += 1;
        state.live.insert(id);
        MockBatch {
            id,
            data,
            n_vectors,
            dim,
        }
    }
}

impl EmbeddingBackend for TrackingBackend {
    type Batch = MockBatch;

    fn generate(
        &self,
        method: MethodId,
        model: ModelId,
        inputs: &[StringSlice<'_>],
    ) -> (i32, Option<MockBatch>) {
        let texts: Vec<String> = inputs.iter().map(|s| s.as_str().to_string()).collect();
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            method,
            model,
            texts: texts.clone(),
        });

        let script = state.script;
        match script {
            Script::Fail { status, with_batch } => {
                let batch = with_batch.then(|| {
                    // Partially populated: first vector only
                    let data = texts.first().map(|t| self.row(0, t)).unwrap_or_default();
                    let n = usize::from(!data.is_empty());
                    Self::allocate(&mut state, data, n, self.dim)
                });
                (status, batch)
            }
            script => {
                let mut data: Vec<f32> = texts
                    .iter()
                    .enumerate()
                    .flat_map(|(i, t)| self.row(i, t))
                    .collect();
                let mut n_vectors = texts.len();
                if script == Script::ExtraVector {
                    data.extend(self.row(n_vectors, "extra"));
                    n_vectors += 1;
                }
                if script == Script::TruncateData {
                    data.pop();
                }
                let batch = Self::allocate(&mut state, data, n_vectors, self.dim);
                (0, Some(batch))
            }
        }
    }

    fn release(&self, batch: MockBatch) {
        let mut state = self.lock();
        if state.live.remove(&batch.id) {
            state.released += 1;
        } else {
            state.unknown_releases += 1;
        }
    }
}
