//! # gembed-types
//!
//! Shared configuration types for gembed.
//!
//! This crate defines the settings consumed by the query-callable embedding
//! functions:
//! - Settings: log level and the capability catalog
//! - Catalog: the embedding methods and models a request may name
//! - Input kinds accepted by each model
//!
//! ## Usage
//!
//! ```rust
//! use gembed_types::Settings;
//!
//! let settings = Settings::default();
//! assert!(settings.catalog.validate().is_ok());
//! ```

pub mod config;
pub mod error;

pub use config::{CatalogSettings, InputKind, MethodEntry, ModelEntry, Settings};
pub use error::ConfigError;
