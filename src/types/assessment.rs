//! Scoring results and churn assessments

use crate::models::backend::BackendKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Probability at or above which a customer is flagged as at risk.
pub const CHURN_THRESHOLD: f64 = 0.5;

/// Binary churn verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskVerdict {
    AtRisk,
    LowRisk,
}

impl RiskVerdict {
    /// Classify a churn probability against [`CHURN_THRESHOLD`]
    pub fn from_probability(probability: f64) -> Self {
        if probability >= CHURN_THRESHOLD {
            RiskVerdict::AtRisk
        } else {
            RiskVerdict::LowRisk
        }
    }

    /// Label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            RiskVerdict::AtRisk => "Customer at risk of churn",
            RiskVerdict::LowRisk => "Low-risk customer",
        }
    }

    pub fn is_at_risk(&self) -> bool {
        matches!(self, RiskVerdict::AtRisk)
    }
}

/// Churn probability and the verdict derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Churn probability (0.0 - 1.0)
    pub probability: f64,
    pub verdict: RiskVerdict,
}

impl ScoringResult {
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            verdict: RiskVerdict::from_probability(probability),
        }
    }

    /// Probability as a percentage with two decimals, e.g. `37.25%`
    pub fn percentage(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

/// A scoring result stamped for display and log correlation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnAssessment {
    /// Unique assessment identifier
    pub assessment_id: String,

    pub result: ScoringResult,

    /// Backend that produced the probability
    pub backend: BackendKind,

    pub scored_at: DateTime<Utc>,
}

impl ChurnAssessment {
    pub fn new(result: ScoringResult, backend: BackendKind) -> Self {
        Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            result,
            backend,
            scored_at: Utc::now(),
        }
    }
}
