//! Scoring backends behind a single probability estimate

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of the churn class in a {stay, churn} probability vector.
pub const CHURN_CLASS_INDEX: usize = 1;

/// Model returning one probability per class for a single row.
pub trait ClassProbabilityModel: Send + Sync {
    /// Class probabilities ordered {stay, churn}
    fn predict_proba(&self, features: &[f32]) -> Result<Vec<f64>>;

    fn name(&self) -> &str;
}

/// Model whose single output is already the churn probability.
pub trait DirectProbabilityModel: Send + Sync {
    fn predict(&self, features: &[f32]) -> Result<f64>;

    fn name(&self) -> &str;
}

/// Which kind of backend was selected at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    ProbabilisticClassifier,
    DirectProbability,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::ProbabilisticClassifier => f.write_str("probabilistic classifier"),
            BackendKind::DirectProbability => f.write_str("direct probability network"),
        }
    }
}

/// Resolved scoring strategy
pub enum ScoringBackend {
    ProbabilisticClassifier(Box<dyn ClassProbabilityModel>),
    DirectProbability(Box<dyn DirectProbabilityModel>),
}

impl ScoringBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            ScoringBackend::ProbabilisticClassifier(_) => BackendKind::ProbabilisticClassifier,
            ScoringBackend::DirectProbability(_) => BackendKind::DirectProbability,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            ScoringBackend::ProbabilisticClassifier(model) => model.name(),
            ScoringBackend::DirectProbability(model) => model.name(),
        }
    }

    /// Churn probability for one dense feature vector.
    pub fn estimate_probability(&self, features: &[f32]) -> Result<f64> {
        let probability = match self {
            ScoringBackend::ProbabilisticClassifier(model) => {
                let proba = model.predict_proba(features)?;
                match proba.get(CHURN_CLASS_INDEX) {
                    Some(&p) => p,
                    None => bail!(
                        "{} returned {} class probabilities, expected at least 2",
                        model.name(),
                        proba.len()
                    ),
                }
            }
            ScoringBackend::DirectProbability(model) => model.predict(features)?,
        };

        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            bail!(
                "{} produced probability {} outside [0, 1]",
                self.model_name(),
                probability
            );
        }

        Ok(probability)
    }
}

impl fmt::Debug for ScoringBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringBackend")
            .field("kind", &self.kind())
            .field("model", &self.model_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProba(Vec<f64>);

    impl ClassProbabilityModel for FixedProba {
        fn predict_proba(&self, _features: &[f32]) -> Result<Vec<f64>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed_proba"
        }
    }

    struct FixedScalar(f64);

    impl DirectProbabilityModel for FixedScalar {
        fn predict(&self, _features: &[f32]) -> Result<f64> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "fixed_scalar"
        }
    }

    #[test]
    fn test_classifier_takes_churn_class() {
        let backend = ScoringBackend::ProbabilisticClassifier(Box::new(FixedProba(vec![0.3, 0.7])));

        assert_eq!(backend.kind(), BackendKind::ProbabilisticClassifier);
        assert_eq!(backend.estimate_probability(&[0.0]).unwrap(), 0.7);
    }

    #[test]
    fn test_direct_returns_scalar() {
        let backend = ScoringBackend::DirectProbability(Box::new(FixedScalar(0.42)));

        assert_eq!(backend.kind(), BackendKind::DirectProbability);
        assert_eq!(backend.estimate_probability(&[0.0]).unwrap(), 0.42);
    }

    #[test]
    fn test_single_class_output_rejected() {
        let backend = ScoringBackend::ProbabilisticClassifier(Box::new(FixedProba(vec![1.0])));
        assert!(backend.estimate_probability(&[0.0]).is_err());
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        for bad in [1.5, -0.1, f64::NAN] {
            let backend = ScoringBackend::DirectProbability(Box::new(FixedScalar(bad)));
            assert!(backend.estimate_probability(&[0.0]).is_err());
        }
    }
}
