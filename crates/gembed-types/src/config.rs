//! Configuration loading for gembed.
//!
//! Layered config: defaults -> config file -> explicit file -> env vars.
//! The default file lives at ~/.config/gembed/config.toml.

use std::collections::HashSet;
use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Kind of input a model accepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Plain text
    #[default]
    Text,
}

impl InputKind {
    /// Raw value passed across the backend boundary.
    pub fn as_raw(self) -> i32 {
        match self {
            InputKind::Text => 0,
        }
    }
}

/// One model offered by an embedding method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelEntry {
    /// Model name as callers spell it
    pub name: String,

    /// Input kinds the model accepts
    #[serde(default = "default_input_kinds")]
    pub input_kinds: Vec<InputKind>,
}

impl ModelEntry {
    /// Create a text model entry.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_kinds: default_input_kinds(),
        }
    }
}

fn default_input_kinds() -> Vec<InputKind> {
    vec![InputKind::Text]
}

/// One embedding method and the models it allows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodEntry {
    /// Method name (e.g., "fastembed", "grpc")
    pub name: String,

    /// Allowed models, in id order
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

impl MethodEntry {
    /// Create a method entry from its name and models.
    pub fn new(name: impl Into<String>, models: Vec<ModelEntry>) -> Self {
        Self {
            name: name.into(),
            models,
        }
    }
}

/// Capability catalog: which methods and models a request may name.
///
/// Method and model ids are positions in these lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSettings {
    #[serde(default = "default_methods")]
    pub methods: Vec<MethodEntry>,
}

fn default_methods() -> Vec<MethodEntry> {
    vec![
        MethodEntry::new(
            "fastembed",
            vec![
                ModelEntry::text("sentence-transformers/all-MiniLM-L6-v2"),
                ModelEntry::text("BAAI/bge-small-en-v1.5"),
            ],
        ),
        MethodEntry::new(
            "grpc",
            vec![ModelEntry::text("sentence-transformers/all-MiniLM-L6-v2")],
        ),
    ]
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            methods: default_methods(),
        }
    }
}

impl CatalogSettings {
    /// Validate catalog contents.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.methods.is_empty() {
            return Err(ConfigError::InvalidCatalog(
                "at least one method is required".to_string(),
            ));
        }

        let mut method_names = HashSet::new();
        for method in &self.methods {
            if method.name.trim().is_empty() {
                return Err(ConfigError::InvalidCatalog(
                    "method name must not be empty".to_string(),
                ));
            }
            if !method_names.insert(method.name.as_str()) {
                return Err(ConfigError::InvalidCatalog(format!(
                    "duplicate method: {}",
                    method.name
                )));
            }

            let mut model_names = HashSet::new();
            for model in &method.models {
                if model.name.trim().is_empty() {
                    return Err(ConfigError::InvalidCatalog(format!(
                        "empty model name under method {}",
                        method.name
                    )));
                }
                if model.input_kinds.is_empty() {
                    return Err(ConfigError::InvalidCatalog(format!(
                        "model {} accepts no input kinds",
                        model.name
                    )));
                }
                if !model_names.insert(model.name.as_str()) {
                    return Err(ConfigError::InvalidCatalog(format!(
                        "duplicate model {} under method {}",
                        model.name, method.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Method names in id order.
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Main settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Capability catalog
    #[serde(default)]
    pub catalog: CatalogSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            catalog: CatalogSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/gembed/config.toml)
    /// 3. Explicit config file (optional)
    /// 4. Environment variables (GEMBED_*)
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from("", "", "gembed")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // GEMBED_LOG_LEVEL -> log_level, GEMBED_CATALOG__... -> catalog.*
        builder = builder.add_source(
            Environment::with_prefix("GEMBED")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.catalog.validate()?;
        Ok(settings)
    }
}
