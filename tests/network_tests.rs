//! Neural-network backend loaded through ONNX Runtime
//!
//! `churn_model.onnx` is the 13 -> 3 relu -> 1 sigmoid network with the same
//! weights as the classifier fixture. `churn_wide.onnx` maps the same 13
//! inputs to two raw scores.

mod common;

use churn_risk_scorer::{
    models::{ArtifactLoader, ArtifactPaths, BackendKind, DirectProbabilityModel, OnnxNetwork},
    ScoringContext,
};
use common::{example_customer, ArtifactDir};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load_context(dir: &ArtifactDir) -> ScoringContext {
    let artifacts = ArtifactLoader::new(ArtifactPaths::in_dir(dir.path()))
        .load()
        .unwrap();
    ScoringContext::from(artifacts)
}

#[test]
fn test_network_input_and_output_resolved() {
    let network = OnnxNetwork::load(fixture("churn_model.onnx"), "churn_model", 1).unwrap();

    assert_eq!(network.n_features_in(), Some(13));
    assert_eq!(network.output_name(), "churn_probability");
    assert_eq!(network.name(), "churn_model");
}

#[test]
fn test_network_preferred_and_agrees_with_classifier() {
    let dir = ArtifactDir::with_fixtures();
    let classifier = load_context(&dir);

    std::fs::copy(fixture("churn_model.onnx"), dir.path().join("churn_model.onnx")).unwrap();
    let network = load_context(&dir);

    assert_eq!(classifier.backend_kind(), BackendKind::ProbabilisticClassifier);
    assert_eq!(network.backend_kind(), BackendKind::DirectProbability);

    let expected = classifier.score(&example_customer()).unwrap();
    let actual = network.score(&example_customer()).unwrap();

    assert!((0.0..=1.0).contains(&actual.probability));
    // f32 graph against the f64 forward pass
    assert!((actual.probability - expected.probability).abs() < 1e-5);
    assert_eq!(actual.verdict, expected.verdict);
}

#[test]
fn test_network_scoring_is_deterministic() {
    let dir = ArtifactDir::with_fixtures();
    std::fs::copy(fixture("churn_model.onnx"), dir.path().join("churn_model.onnx")).unwrap();
    let context = load_context(&dir);

    let first = context.score(&example_customer()).unwrap();
    for _ in 0..3 {
        let again = context.score(&example_customer()).unwrap();
        assert_eq!(first.probability.to_bits(), again.probability.to_bits());
    }
}

#[test]
fn test_multi_value_output_is_a_fault() {
    let network = OnnxNetwork::load(fixture("churn_wide.onnx"), "churn_wide", 1).unwrap();

    // no output name mentions a probability, so the last output is used
    assert_eq!(network.output_name(), "scores");

    let err = network.predict(&[0.0; 13]).unwrap_err();
    assert!(err.to_string().contains("produced 2 values"));
}

#[test]
fn test_multi_value_network_faults_every_request() {
    let dir = ArtifactDir::with_fixtures();
    std::fs::copy(fixture("churn_wide.onnx"), dir.path().join("churn_model.onnx")).unwrap();
    let context = load_context(&dir);

    assert!(context.score(&example_customer()).is_err());
    assert!(context.score(&example_customer()).is_err());
}
