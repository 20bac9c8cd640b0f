//! # gembed-backend
//!
//! The boundary between gembed and the batch embedding backend.
//!
//! The backend itself (model execution, local inference or gRPC) lives
//! outside this workspace. This crate describes what gembed needs from it:
//!
//! - `EmbeddingBackend`: one batch call per request, plus batch release
//! - `CapabilityCatalog`: method/model lookup, injected so tests can swap it
//! - `BatchHandle`: owns a backend batch and releases it exactly once
//! - `TrackingBackend`: allocation-tracking double for tests
//!
//! ## Features
//! - `ffi`: bind the native backend's C symbols (`NativeBackend`)

pub mod catalog;
pub mod contract;
pub mod error;
pub mod guard;
pub mod mock;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use catalog::{CapabilityCatalog, StaticCatalog};
pub use contract::{check_status, BatchView, EmbeddingBackend, MethodId, ModelId, StringSlice};
pub use error::BackendError;
pub use guard::BatchHandle;
pub use mock::{MockBatch, RecordedCall, Script, TrackingBackend};

#[cfg(feature = "ffi")]
pub use ffi::NativeBackend;

pub use gembed_types::InputKind;
