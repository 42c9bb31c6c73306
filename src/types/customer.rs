//! Customer record submitted for churn scoring

use crate::error::DomainError;
use crate::preprocess::{FeatureRow, FieldValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Country of the customer's account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Geography {
    France,
    Spain,
    Germany,
}

impl Geography {
    pub const ALL: [Geography; 3] = [Geography::France, Geography::Spain, Geography::Germany];

    pub fn as_str(&self) -> &'static str {
        match self {
            Geography::France => "France",
            Geography::Spain => "Spain",
            Geography::Germany => "Germany",
        }
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents one bank customer to be scored for churn risk.
///
/// Field names serialize to the dataset column names (`CreditScore`,
/// `NumOfProducts`, ...) which is also what the preprocessor is keyed by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerRecord {
    /// Credit score, 300 to 900
    pub credit_score: u16,

    pub geography: Geography,

    pub gender: Gender,

    /// Age in years, 18 to 100
    pub age: u8,

    /// Years as a customer, 0 to 10
    pub tenure: u8,

    /// Account balance
    pub balance: f64,

    /// Number of bank products held, 1 to 4
    pub num_of_products: u8,

    /// 1 if the customer holds a credit card
    pub has_cr_card: u8,

    /// 1 if the customer uses the services regularly
    pub is_active_member: u8,

    pub estimated_salary: f64,
}

impl CustomerRecord {
    pub const CREDIT_SCORE_RANGE: (u16, u16) = (300, 900);
    pub const AGE_RANGE: (u8, u8) = (18, 100);
    pub const TENURE_RANGE: (u8, u8) = (0, 10);
    pub const PRODUCT_CHOICES: [u8; 4] = [1, 2, 3, 4];
    pub const FLAG_CHOICES: [u8; 2] = [0, 1];

    /// Dataset column names, in the order the form presents them.
    pub const FIELD_NAMES: [&'static str; 10] = [
        "CreditScore",
        "Geography",
        "Gender",
        "Age",
        "Tenure",
        "Balance",
        "NumOfProducts",
        "HasCrCard",
        "IsActiveMember",
        "EstimatedSalary",
    ];

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<(), DomainError> {
        let (lo, hi) = Self::CREDIT_SCORE_RANGE;
        if !(lo..=hi).contains(&self.credit_score) {
            return Err(DomainError::new(
                "CreditScore",
                format!("must be between {} and {}", lo, hi),
            ));
        }

        let (lo, hi) = Self::AGE_RANGE;
        if !(lo..=hi).contains(&self.age) {
            return Err(DomainError::new(
                "Age",
                format!("must be between {} and {}", lo, hi),
            ));
        }

        let (lo, hi) = Self::TENURE_RANGE;
        if !(lo..=hi).contains(&self.tenure) {
            return Err(DomainError::new(
                "Tenure",
                format!("must be between {} and {}", lo, hi),
            ));
        }

        check_amount("Balance", self.balance)?;
        check_amount("EstimatedSalary", self.estimated_salary)?;

        if !Self::PRODUCT_CHOICES.contains(&self.num_of_products) {
            return Err(DomainError::new("NumOfProducts", "must be 1, 2, 3 or 4"));
        }
        if !Self::FLAG_CHOICES.contains(&self.has_cr_card) {
            return Err(DomainError::new("HasCrCard", "must be 0 or 1"));
        }
        if !Self::FLAG_CHOICES.contains(&self.is_active_member) {
            return Err(DomainError::new("IsActiveMember", "must be 0 or 1"));
        }

        Ok(())
    }

    /// Wrap the record as a single name-keyed row for the preprocessor.
    pub fn to_feature_row(&self) -> FeatureRow {
        FeatureRow::from_iter([
            ("CreditScore", FieldValue::from(self.credit_score as f64)),
            ("Geography", FieldValue::from(self.geography.as_str())),
            ("Gender", FieldValue::from(self.gender.as_str())),
            ("Age", FieldValue::from(self.age as f64)),
            ("Tenure", FieldValue::from(self.tenure as f64)),
            ("Balance", FieldValue::from(self.balance)),
            ("NumOfProducts", FieldValue::from(self.num_of_products as f64)),
            ("HasCrCard", FieldValue::from(self.has_cr_card as f64)),
            ("IsActiveMember", FieldValue::from(self.is_active_member as f64)),
            ("EstimatedSalary", FieldValue::from(self.estimated_salary)),
        ])
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), DomainError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DomainError::new(field, "must be a non-negative amount"))
    }
}

impl Default for CustomerRecord {
    /// Values the form is pre-filled with.
    fn default() -> Self {
        Self {
            credit_score: 650,
            geography: Geography::France,
            gender: Gender::Male,
            age: 40,
            tenure: 5,
            balance: 50000.0,
            num_of_products: 1,
            has_cr_card: 0,
            is_active_member: 0,
            estimated_salary: 60000.0,
        }
    }
}
