//! Configuration tests: the capability catalog comes from settings.

use std::io::Write;

use pretty_assertions::assert_eq;

use e2e_tests::init_tracing;
use gembed_backend::{CapabilityCatalog, InputKind, MethodId, ModelId, TrackingBackend};
use gembed_sql::{Gembed, GembedError};
use gembed_types::Settings;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create config file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write config file");
    file
}

/// Methods and models declared in a config file drive validation.
#[test]
fn test_catalog_from_config_file() {
    let file = write_config(
        r#"
log_level = "debug"

[[catalog.methods]]
name = "local"

[[catalog.methods.models]]
name = "mini"

[[catalog.methods.models]]
name = "large"
input_kinds = ["text"]
"#,
    );

    let settings = Settings::load(Some(&file.path().to_string_lossy())).unwrap();
    init_tracing(&settings);
    assert_eq!(settings.log_level, "debug");

    let gembed = Gembed::from_settings(&settings, TrackingBackend::new(3)).unwrap();
    assert_eq!(
        gembed.catalog().model_id(MethodId(0), "large", InputKind::Text),
        Some(ModelId(1))
    );

    let vectors = gembed
        .generate_embeddings("local", "large", &[Some("hello")])
        .unwrap()
        .unwrap();
    assert_eq!(vectors.len(), 1);
    assert_eq!(gembed.backend().calls()[0].model, ModelId(1));

    let err = gembed
        .generate_embeddings("fastembed", "mini", &[Some("hello")])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid embedding method: fastembed (use 'local')"
    );
}

/// A catalog with duplicate methods is rejected at load time.
#[test]
fn test_invalid_catalog_rejected() {
    let file = write_config(
        r#"
[[catalog.methods]]
name = "grpc"

[[catalog.methods]]
name = "grpc"
"#,
    );

    let err = Settings::load(Some(&file.path().to_string_lossy())).unwrap_err();
    assert!(err.to_string().contains("duplicate method: grpc"));
}

/// Building functions from invalid settings surfaces a configuration error.
#[test]
fn test_from_settings_validates() {
    let mut settings = Settings::default();
    settings.catalog.methods.clear();

    let err = Gembed::from_settings(&settings, TrackingBackend::new(3)).unwrap_err();
    assert!(matches!(err, GembedError::Config(_)));
}
