//! Shared fixtures: artifacts written into a throwaway directory

#![allow(dead_code)]

use churn_risk_scorer::types::{CustomerRecord, Gender, Geography};
use std::path::{Path, PathBuf};

pub const PREPROCESS_JSON: &str = r#"{
    "transformers": [
        {
            "kind": "standard_scaler",
            "columns": ["CreditScore", "Age", "Tenure", "Balance", "NumOfProducts",
                        "HasCrCard", "IsActiveMember", "EstimatedSalary"],
            "mean": [650.5, 38.9, 5.0, 76485.9, 1.53, 0.71, 0.52, 100090.2],
            "scale": [96.7, 10.5, 2.9, 62397.4, 0.58, 0.46, 0.50, 57510.5]
        },
        {
            "kind": "one_hot_encoder",
            "columns": ["Geography", "Gender"],
            "categories": [["France", "Germany", "Spain"], ["Female", "Male"]],
            "handle_unknown": "ignore"
        }
    ],
    "sparse_output": false
}"#;

/// 13 inputs, 3 relu hidden units, logistic output
pub const MLP_JSON: &str = r#"{
    "name": "fixture_mlp",
    "activation": "relu",
    "out_activation": "logistic",
    "classes": [0, 1],
    "coefs": [
        [[-0.20, 0.10, 0.05],
         [0.90, -0.30, 0.40],
         [-0.05, 0.02, 0.01],
         [0.25, 0.10, -0.15],
         [0.30, -0.60, 0.20],
         [-0.02, 0.03, 0.00],
         [-0.50, 0.20, -0.35],
         [0.02, -0.01, 0.03],
         [-0.10, 0.05, 0.00],
         [0.45, -0.20, 0.30],
         [-0.05, 0.10, -0.02],
         [0.15, -0.05, 0.10],
         [-0.15, 0.05, -0.10]],
        [[1.20], [-0.80], [0.90]]
    ],
    "intercepts": [[0.10, 0.05, -0.05], [-0.40]]
}"#;

/// Temporary artifact directory removed on drop
pub struct ArtifactDir {
    pub path: PathBuf,
}

impl ArtifactDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("churn-artifacts-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    /// Directory holding the fixture preprocessor and classifier
    pub fn with_fixtures() -> Self {
        let dir = Self::new();
        dir.write("preprocess.json", PREPROCESS_JSON);
        dir.write("mlp_model.json", MLP_JSON);
        dir
    }

    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.path.join(name), contents).unwrap();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ArtifactDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.path).ok();
    }
}

/// The example customer from the product documentation
pub fn example_customer() -> CustomerRecord {
    CustomerRecord {
        credit_score: 650,
        geography: Geography::France,
        gender: Gender::Female,
        age: 40,
        tenure: 5,
        balance: 50000.0,
        num_of_products: 2,
        has_cr_card: 1,
        is_active_member: 1,
        estimated_salary: 60000.0,
    }
}
