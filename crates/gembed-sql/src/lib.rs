//! # gembed-sql
//!
//! Query-callable batch embedding functions.
//!
//! A query engine hands over a collection of texts; this crate validates the
//! request, packs the texts into one contiguous batch of borrowed views, calls
//! the embedding backend exactly once, and returns the vectors. The
//! id-paired variant returns them as a set-returning function, one
//! `(sentence_id, embedding)` row per invocation, resuming from a cursor the
//! engine keeps between calls.
//!
//! ## Pipeline
//! - `validate`: method/model lookup in the capability catalog
//! - `assemble`: null and arity checks, ordered `StringSlice` batch
//! - `invoke`: the single backend call, batch ownership, status mapping
//! - `materialize`: batch to host vectors (one-shot function)
//! - `cursor`: batch to id/vector pairs replayed row by row
//!
//! ## Usage
//!
//! ```rust
//! use gembed_backend::{StaticCatalog, TrackingBackend};
//! use gembed_sql::Gembed;
//!
//! let backend = TrackingBackend::with_vectors(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
//! let gembed = Gembed::new(StaticCatalog::default(), backend);
//! let model = "sentence-transformers/all-MiniLM-L6-v2";
//!
//! let ids = [Some(7), Some(9)];
//! let texts = [Some("a"), Some("b")];
//! let rows: Vec<_> = gembed
//!     .stream_embeddings_with_ids("fastembed", model, &ids, &texts)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(rows[0].sentence_id, 7);
//! assert_eq!(rows[1].embedding.to_string(), "[0,1,0]");
//! ```

pub mod assemble;
pub mod cursor;
pub mod error;
pub mod functions;
pub mod invoke;
pub mod materialize;
pub mod sql;
pub mod srf;
pub mod validate;
pub mod vector;

pub use assemble::{assemble_texts, assemble_with_ids, EmbeddingRequest, IdentifiedRequest};
pub use cursor::{EmbeddingCursor, EmbeddingRow, IdentifiedVector};
pub use error::GembedError;
pub use functions::{Gembed, GenerateEmbeddingsWithIds};
pub use invoke::invoke;
pub use materialize::materialize;
pub use sql::extension_sql;
pub use srf::{FuncCallContext, RowProducer, SrfStep, ValuePerCall};
pub use validate::{validate_call, ValidatedCall};
pub use vector::{Vector, VECTOR_MAX_DIM};
