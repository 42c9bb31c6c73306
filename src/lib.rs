//! Churn Risk Scorer Library
//!
//! Scores bank customers for churn risk with a fitted feature preprocessor
//! and a pre-trained classifier, behind a small HTML form.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod preprocess;
pub mod scoring;
pub mod types;
pub mod web;

pub use config::AppConfig;
pub use error::{ArtifactError, DomainError};
pub use models::{ArtifactLoader, BackendKind, ScoringBackend};
pub use preprocess::FeaturePreprocessor;
pub use scoring::ScoringContext;
pub use types::{CustomerRecord, RiskVerdict, ScoringResult};
