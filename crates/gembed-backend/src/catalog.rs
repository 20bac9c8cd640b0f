//! Capability catalog.
//!
//! Read-only lookup of embedding methods and the models each method allows.

use tracing::debug;

use gembed_types::{CatalogSettings, InputKind, MethodEntry};

use crate::contract::{MethodId, ModelId};
use crate::error::BackendError;

/// Method/model lookup consulted before any request is assembled.
///
/// Both lookups are pure: same inputs, same answer, no side effects.
pub trait CapabilityCatalog {
    /// Resolve a method name.
    fn method_id(&self, name: &str) -> Option<MethodId>;

    /// Resolve a model name under a method for the given input kind.
    fn model_id(&self, method: MethodId, name: &str, kind: InputKind) -> Option<ModelId>;

    /// Method names to suggest when a lookup fails.
    fn method_names(&self) -> Vec<String>;
}

/// Catalog backed by configured settings.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    methods: Vec<MethodEntry>,
}

impl StaticCatalog {
    /// Build from settings, validating them first.
    pub fn from_settings(settings: &CatalogSettings) -> Result<Self, BackendError> {
        settings.validate()?;
        debug!(methods = settings.methods.len(), "Capability catalog loaded");
        Ok(Self {
            methods: settings.methods.clone(),
        })
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self {
            methods: CatalogSettings::default().methods,
        }
    }
}

impl CapabilityCatalog for StaticCatalog {
    fn method_id(&self, name: &str) -> Option<MethodId> {
        self.methods
            .iter()
            .position(|m| m.name == name)
            .map(|idx| MethodId(idx as u32))
    }

    fn model_id(&self, method: MethodId, name: &str, kind: InputKind) -> Option<ModelId> {
        let entry = self.methods.get(method.0 as usize)?;
        entry
            .models
            .iter()
            .position(|m| m.name == name && m.input_kinds.contains(&kind))
            .map(|idx| ModelId(idx as u32))
    }

    fn method_names(&self) -> Vec<String> {
        self.methods.iter().map(|m| m.name.clone()).collect()
    }
}
