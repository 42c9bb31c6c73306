//! Scoring model backends and artifact loading

pub mod backend;
pub mod loader;
pub mod mlp;
pub mod onnx;

pub use backend::{BackendKind, ClassProbabilityModel, DirectProbabilityModel, ScoringBackend};
pub use loader::{ArtifactLoader, ArtifactPaths, LoadedArtifacts};
pub use mlp::MlpClassifier;
pub use onnx::OnnxNetwork;
