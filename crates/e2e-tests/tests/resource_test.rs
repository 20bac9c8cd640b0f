//! Batch ownership tests.
//!
//! Whatever the outcome of a request, every batch the backend handed out has
//! been released exactly once by the time the request completes.

use pretty_assertions::assert_eq;

use e2e_tests::{TestHarness, METHOD, MODEL};
use gembed_backend::{Script, TrackingBackend};

fn assert_all_released(backend: &TrackingBackend) {
    assert_eq!(backend.outstanding(), 0, "batch left unreleased");
    assert_eq!(backend.released(), backend.allocated());
    assert_eq!(backend.unknown_releases(), 0, "batch released twice");
}

#[test]
fn test_one_shot_success_releases() {
    let harness = TestHarness::new(4);
    harness
        .gembed
        .generate_embeddings(METHOD, MODEL, &[Some("a"), Some("b")])
        .unwrap();
    assert_eq!(harness.backend().allocated(), 1);
    assert_all_released(harness.backend());
}

#[test]
fn test_streaming_success_releases_before_first_row() {
    let harness = TestHarness::new(4);
    let ids = [Some(1), Some(2)];
    let texts = [Some("a"), Some("b")];
    let mut stream = harness
        .gembed
        .stream_embeddings_with_ids(METHOD, MODEL, &ids, &texts);

    stream.call().unwrap();

    // Rows own copies; the batch is already back with the backend
    assert_eq!(harness.backend().allocated(), 1);
    assert_all_released(harness.backend());
}

#[test]
fn test_failure_with_partial_batch_releases() {
    for with_batch in [true, false] {
        let harness = TestHarness::new(4);
        harness.backend().script(Script::Fail {
            status: -9,
            with_batch,
        });

        assert!(harness
            .gembed
            .generate_embeddings(METHOD, MODEL, &[Some("a"), Some("b")])
            .is_err());

        let ids = [Some(1), Some(2)];
        let texts = [Some("a"), Some("b")];
        assert!(harness
            .gembed
            .stream_embeddings_with_ids(METHOD, MODEL, &ids, &texts)
            .call()
            .is_err());

        assert_eq!(harness.backend().allocated(), if with_batch { 2 } else { 0 });
        assert_all_released(harness.backend());
    }
}

#[test]
fn test_malformed_batches_release() {
    for script in [Script::ExtraVector, Script::TruncateData] {
        let harness = TestHarness::new(4);
        harness.backend().script(script);

        assert!(harness
            .gembed
            .generate_embeddings(METHOD, MODEL, &[Some("a"), Some("b")])
            .is_err());

        let ids = [Some(1), Some(2)];
        let texts = [Some("a"), Some("b")];
        assert!(harness
            .gembed
            .stream_embeddings_with_ids(METHOD, MODEL, &ids, &texts)
            .call()
            .is_err());

        assert_eq!(harness.backend().allocated(), 2);
        assert_all_released(harness.backend());
    }
}

#[test]
fn test_unrepresentable_vectors_release() {
    let backend = TrackingBackend::with_vectors(vec![vec![0.5, f32::INFINITY]]);
    let harness = TestHarness::with_backend(backend);

    assert!(harness
        .gembed
        .generate_embeddings(METHOD, MODEL, &[Some("a")])
        .is_err());

    let ids = [Some(1)];
    let texts = [Some("a")];
    assert!(harness
        .gembed
        .stream_embeddings_with_ids(METHOD, MODEL, &ids, &texts)
        .call()
        .is_err());

    assert_all_released(harness.backend());
}

#[test]
fn test_validation_failures_allocate_nothing() {
    let harness = TestHarness::new(4);
    let _ = harness.gembed.generate_embeddings("nope", MODEL, &[Some("a")]);
    let ids = [Some(1)];
    let texts: [Option<&str>; 2] = [Some("a"), Some("b")];
    let _ = harness
        .gembed
        .stream_embeddings_with_ids(METHOD, MODEL, &ids, &texts)
        .call();

    assert_eq!(harness.backend().allocated(), 0);
    assert_eq!(harness.backend().call_count(), 0);
}
