//! End-to-end test infrastructure for gembed.
//!
//! Provides a shared TestHarness wiring the embedding functions to an
//! allocation-tracking backend, plus input generators for property tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gembed_backend::{StaticCatalog, TrackingBackend};
use gembed_sql::Gembed;
use gembed_types::{CatalogSettings, MethodEntry, ModelEntry, Settings};

/// Method every harness catalog offers.
pub const METHOD: &str = "fastembed";

/// Model every harness method allows.
pub const MODEL: &str = "m1";

/// Install a test subscriber once; `RUST_LOG` overrides the configured level.
pub fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    // Another test may already have installed one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Settings with a small catalog: `fastembed` and `grpc`, both allowing `m1`.
pub fn test_settings() -> Settings {
    Settings {
        log_level: "debug".to_string(),
        catalog: CatalogSettings {
            methods: vec![
                MethodEntry::new(METHOD, vec![ModelEntry::text(MODEL)]),
                MethodEntry::new("grpc", vec![ModelEntry::text(MODEL)]),
            ],
        },
    }
}

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Embedding functions over a tracking backend
    pub gembed: Gembed<StaticCatalog, TrackingBackend>,
}

impl TestHarness {
    /// Harness whose backend fingerprints each text into `dim` floats.
    pub fn new(dim: usize) -> Self {
        Self::with_backend(TrackingBackend::new(dim))
    }

    /// Harness around a prepared backend.
    pub fn with_backend(backend: TrackingBackend) -> Self {
        let settings = test_settings();
        init_tracing(&settings);
        let gembed = Gembed::from_settings(&settings, backend).expect("Failed to build functions");
        info!(
            methods = settings.catalog.methods.len(),
            log_level = %settings.log_level,
            "Test harness ready"
        );
        Self { gembed }
    }

    pub fn backend(&self) -> &TrackingBackend {
        self.gembed.backend()
    }
}

/// Seeded generator so failures reproduce.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `count` distinct texts of random length.
pub fn random_texts(rng: &mut StdRng, count: usize) -> Vec<Option<String>> {
    (0..count)
        .map(|i| {
            let words = rng.random_range(1..6);
            let body: Vec<String> = (0..words)
                .map(|_| format!("w{}", rng.random_range(0..1000)))
                .collect();
            Some(format!("{} {}", i, body.join(" ")))
        })
        .collect()
}

/// `count` random identifiers (duplicates allowed).
pub fn random_ids(rng: &mut StdRng, count: usize) -> Vec<Option<i32>> {
    (0..count).map(|_| Some(rng.random_range(-1000..1000))).collect()
}
