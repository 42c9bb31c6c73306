//! Demo Artifact Generator
//!
//! Writes a demo preprocessor and a randomly initialised MLP classifier so the
//! scoring form can run without the external training pipeline, then scores a
//! few random customers against them.

use anyhow::{Context, Result};
use churn_risk_scorer::{
    models::{mlp::Activation, ArtifactLoader, ArtifactPaths, MlpClassifier},
    preprocess::{ColumnTransform, FeaturePreprocessor, HandleUnknown},
    types::{CustomerRecord, Gender, Geography},
    ScoringContext,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::info;

/// Random generator for weights and sample customers
struct ArtifactGenerator {
    rng: StdRng,
}

impl ArtifactGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Scaler statistics typical of the bank churn dataset
    fn preprocessor(&self) -> Result<FeaturePreprocessor> {
        let numeric = [
            ("CreditScore", 650.5, 96.7),
            ("Age", 38.9, 10.5),
            ("Tenure", 5.0, 2.9),
            ("Balance", 76485.9, 62397.4),
            ("NumOfProducts", 1.53, 0.58),
            ("HasCrCard", 0.71, 0.46),
            ("IsActiveMember", 0.52, 0.50),
            ("EstimatedSalary", 100090.2, 57510.5),
        ];

        FeaturePreprocessor::new(
            vec![
                ColumnTransform::StandardScaler {
                    columns: numeric.iter().map(|(c, _, _)| c.to_string()).collect(),
                    mean: numeric.iter().map(|(_, m, _)| *m).collect(),
                    scale: numeric.iter().map(|(_, _, s)| *s).collect(),
                },
                ColumnTransform::OneHotEncoder {
                    columns: vec!["Geography".to_string(), "Gender".to_string()],
                    categories: vec![
                        vec!["France".into(), "Germany".into(), "Spain".into()],
                        vec!["Female".into(), "Male".into()],
                    ],
                    handle_unknown: HandleUnknown::Ignore,
                    drop: None,
                },
            ],
            false,
        )
    }

    /// Glorot-uniform initialised MLP with one hidden layer
    fn classifier(&mut self, n_features: usize, hidden: usize) -> Result<MlpClassifier> {
        let layers = [(n_features, hidden), (hidden, 1)];
        let mut coefs: Vec<Vec<Vec<f64>>> = Vec::with_capacity(layers.len());
        let mut intercepts: Vec<Vec<f64>> = Vec::with_capacity(layers.len());

        for (n_in, n_out) in layers {
            let bound = (6.0 / (n_in + n_out) as f64).sqrt();
            coefs.push(
                (0..n_in)
                    .map(|_| (0..n_out).map(|_| self.rng.gen_range(-bound..bound)).collect())
                    .collect(),
            );
            intercepts.push((0..n_out).map(|_| self.rng.gen_range(-bound..bound)).collect());
        }

        let model = MlpClassifier {
            name: "demo_mlp".to_string(),
            activation: Activation::Relu,
            out_activation: Activation::Logistic,
            classes: vec![0, 1],
            coefs,
            intercepts,
        };
        model.validate()?;
        Ok(model)
    }

    /// Random in-domain customer
    fn customer(&mut self) -> CustomerRecord {
        CustomerRecord {
            credit_score: self.rng.gen_range(300..=900),
            geography: Geography::ALL[self.rng.gen_range(0..Geography::ALL.len())],
            gender: Gender::ALL[self.rng.gen_range(0..Gender::ALL.len())],
            age: self.rng.gen_range(18..=100),
            tenure: self.rng.gen_range(0..=10),
            balance: self.rng.gen_range(0.0..250000.0),
            num_of_products: self.rng.gen_range(1..=4),
            has_cr_card: self.rng.gen_range(0..=1),
            is_active_member: self.rng.gen_range(0..=1),
            estimated_salary: self.rng.gen_range(0.0..200000.0),
        }
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Artifact written");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("demo_artifacts=info".parse()?)
                .add_directive("churn_risk_scorer=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let out_dir = args.get(1).map(|s| s.as_str()).unwrap_or(".");
    let seed: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(42);
    let hidden: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(8);
    let samples: usize = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(5);

    info!(out_dir = %out_dir, seed = seed, hidden = hidden, "Generating demo artifacts");

    let out_dir = Path::new(out_dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut generator = ArtifactGenerator::new(seed);
    let preprocessor = generator.preprocessor()?;
    let classifier = generator.classifier(preprocessor.n_features_out(), hidden.max(1))?;

    let paths = ArtifactPaths::in_dir(out_dir);
    write_json(&paths.preprocessor, &preprocessor)?;
    write_json(&paths.classifier, &classifier)?;

    // Round-trip through the loader the server uses
    let context = ScoringContext::from(ArtifactLoader::new(paths).load()?);
    for i in 0..samples {
        let customer = generator.customer();
        let result = context.score(&customer)?;
        info!(
            sample = i + 1,
            age = customer.age,
            geography = %customer.geography,
            probability = %result.percentage(),
            verdict = ?result.verdict,
            "Sample customer scored"
        );
    }

    Ok(())
}
