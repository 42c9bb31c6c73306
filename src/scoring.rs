//! Churn scoring over the loaded artifacts

use crate::models::backend::{BackendKind, ScoringBackend};
use crate::models::loader::LoadedArtifacts;
use crate::preprocess::{FeaturePreprocessor, FeatureRow};
use crate::types::{ChurnAssessment, CustomerRecord, ScoringResult};
use anyhow::{Context, Result};
use tracing::debug;

/// Preprocessor and backend shared read-only by every request
#[derive(Debug)]
pub struct ScoringContext {
    preprocessor: FeaturePreprocessor,
    backend: ScoringBackend,
}

impl ScoringContext {
    pub fn new(preprocessor: FeaturePreprocessor, backend: ScoringBackend) -> Self {
        Self {
            preprocessor,
            backend,
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn preprocessor(&self) -> &FeaturePreprocessor {
        &self.preprocessor
    }

    /// Dense feature vector for a name-keyed row
    pub fn transform_row(&self, row: &FeatureRow) -> Result<Vec<f32>> {
        let matrix = self
            .preprocessor
            .transform(row)
            .context("Feature transform failed")?;
        Ok(matrix.into_dense())
    }

    /// Churn probability for a name-keyed row
    pub fn score_row(&self, row: &FeatureRow) -> Result<ScoringResult> {
        let features = self.transform_row(row)?;
        let probability = self
            .backend
            .estimate_probability(&features)
            .context("Probability estimation failed")?;
        Ok(ScoringResult::new(probability))
    }

    /// Score one customer record.
    pub fn score(&self, record: &CustomerRecord) -> Result<ScoringResult> {
        let result = self.score_row(&record.to_feature_row())?;

        debug!(
            backend = %self.backend.kind(),
            probability = result.probability,
            verdict = ?result.verdict,
            "Customer scored"
        );

        Ok(result)
    }

    /// Score and stamp the result for display.
    pub fn assess(&self, record: &CustomerRecord) -> Result<ChurnAssessment> {
        let result = self.score(record)?;
        Ok(ChurnAssessment::new(result, self.backend.kind()))
    }
}

impl From<LoadedArtifacts> for ScoringContext {
    fn from(artifacts: LoadedArtifacts) -> Self {
        Self::new(artifacts.preprocessor, artifacts.backend)
    }
}
