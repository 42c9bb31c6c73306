//! Type definitions for churn scoring

pub mod assessment;
pub mod customer;

pub use assessment::{ChurnAssessment, RiskVerdict, ScoringResult, CHURN_THRESHOLD};
pub use customer::{CustomerRecord, Gender, Geography};
