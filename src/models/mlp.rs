//! Multi-layer perceptron classifier exported as JSON
//!
//! Mirrors the fitted attributes of a scikit-learn `MLPClassifier`:
//! `coefs[i]` is an `n_in x n_out` matrix and `intercepts[i]` its bias.

use crate::models::backend::ClassProbabilityModel;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Hidden or output layer activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Identity,
    Logistic,
    Tanh,
    Relu,
    Softmax,
}

impl Activation {
    fn apply(&self, values: &mut [f64]) {
        match self {
            Activation::Identity => {}
            Activation::Logistic => values.iter_mut().for_each(|v| *v = sigmoid(*v)),
            Activation::Tanh => values.iter_mut().for_each(|v| *v = v.tanh()),
            Activation::Relu => values.iter_mut().for_each(|v| *v = v.max(0.0)),
            Activation::Softmax => {
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mut sum = 0.0;
                for v in values.iter_mut() {
                    *v = (*v - max).exp();
                    sum += *v;
                }
                values.iter_mut().for_each(|v| *v /= sum);
            }
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn default_out_activation() -> Activation {
    Activation::Logistic
}

fn default_name() -> String {
    "mlp".to_string()
}

/// Fitted MLP binary classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpClassifier {
    #[serde(default = "default_name")]
    pub name: String,
    /// Hidden layer activation
    pub activation: Activation,
    #[serde(default = "default_out_activation")]
    pub out_activation: Activation,
    /// Class labels, must be `[0, 1]`
    pub classes: Vec<i64>,
    pub coefs: Vec<Vec<Vec<f64>>>,
    pub intercepts: Vec<Vec<f64>>,
}

impl MlpClassifier {
    /// Parse and validate a JSON export.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json).context("Failed to parse MLP JSON")?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        if self.classes != [0, 1] {
            bail!("expected classes [0, 1], got {:?}", self.classes);
        }
        if self.activation == Activation::Softmax {
            bail!("softmax is only valid as the output activation");
        }
        if self.coefs.is_empty() {
            bail!("model has no layers");
        }
        if self.coefs.len() != self.intercepts.len() {
            bail!(
                "{} weight matrices but {} bias vectors",
                self.coefs.len(),
                self.intercepts.len()
            );
        }

        let mut n_in = self.n_features_in();
        for (layer, (weights, bias)) in self.coefs.iter().zip(&self.intercepts).enumerate() {
            if weights.len() != n_in || n_in == 0 {
                bail!("layer {} has {} input rows, expected {}", layer, weights.len(), n_in);
            }
            let n_out = bias.len();
            if weights.iter().any(|row| row.len() != n_out) {
                bail!("layer {} weight rows do not match {} biases", layer, n_out);
            }
            n_in = n_out;
        }

        match (self.out_activation, n_in) {
            (Activation::Logistic, 1) => {}
            (Activation::Softmax, n) if n == self.classes.len() => {}
            (activation, n) => bail!(
                "output layer of width {} with {:?} activation cannot produce {} class probabilities",
                n,
                activation,
                self.classes.len()
            ),
        }

        Ok(())
    }

    /// Width of the expected feature vector
    pub fn n_features_in(&self) -> usize {
        self.coefs.first().map(|w| w.len()).unwrap_or(0)
    }

    fn forward(&self, features: &[f32]) -> Result<Vec<f64>> {
        if features.len() != self.n_features_in() {
            bail!(
                "{} expects {} features, got {}",
                self.name,
                self.n_features_in(),
                features.len()
            );
        }

        let mut activations: Vec<f64> = features.iter().map(|&x| x as f64).collect();
        let last = self.coefs.len() - 1;

        for (layer, (weights, bias)) in self.coefs.iter().zip(&self.intercepts).enumerate() {
            let mut next = bias.clone();
            for (a, row) in activations.iter().zip(weights) {
                for (out, w) in next.iter_mut().zip(row) {
                    *out += a * w;
                }
            }

            if layer == last {
                self.out_activation.apply(&mut next);
            } else {
                self.activation.apply(&mut next);
            }
            activations = next;
        }

        Ok(activations)
    }
}

impl ClassProbabilityModel for MlpClassifier {
    fn predict_proba(&self, features: &[f32]) -> Result<Vec<f64>> {
        let output = self.forward(features)?;
        if output.len() == 1 {
            let p = output[0];
            Ok(vec![1.0 - p, p])
        } else {
            Ok(output)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_layer(weights: Vec<f64>, bias: f64) -> MlpClassifier {
        MlpClassifier {
            name: "test".to_string(),
            activation: Activation::Relu,
            out_activation: Activation::Logistic,
            classes: vec![0, 1],
            coefs: vec![weights.into_iter().map(|w| vec![w]).collect()],
            intercepts: vec![vec![bias]],
        }
    }

    #[test]
    fn test_logistic_output_gives_two_probabilities() {
        let model = single_layer(vec![1.0, -1.0], 0.0);
        model.validate().unwrap();

        let proba = model.predict_proba(&[2.0, 2.0]).unwrap();
        assert_eq!(proba.len(), 2);
        assert!((proba[0] - 0.5).abs() < 1e-12);
        assert!((proba[1] - 0.5).abs() < 1e-12);

        let proba = model.predict_proba(&[3.0, 0.0]).unwrap();
        assert!((proba[1] - sigmoid(3.0)).abs() < 1e-12);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hidden_layer_relu() {
        // hidden = relu([x0 - x1, x1 - x0]); out = hidden0 + hidden1
        let model = MlpClassifier {
            name: "two_layer".to_string(),
            activation: Activation::Relu,
            out_activation: Activation::Logistic,
            classes: vec![0, 1],
            coefs: vec![
                vec![vec![1.0, -1.0], vec![-1.0, 1.0]],
                vec![vec![1.0], vec![1.0]],
            ],
            intercepts: vec![vec![0.0, 0.0], vec![-1.0]],
        };
        model.validate().unwrap();

        let proba = model.predict_proba(&[3.0, 1.0]).unwrap();
        assert!((proba[1] - sigmoid(1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_softmax_output() {
        let model = MlpClassifier {
            name: "softmax".to_string(),
            activation: Activation::Identity,
            out_activation: Activation::Softmax,
            classes: vec![0, 1],
            coefs: vec![vec![vec![1.0, -1.0]]],
            intercepts: vec![vec![0.0, 0.0]],
        };
        model.validate().unwrap();

        let proba = model.predict_proba(&[1.0]).unwrap();
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(proba[0] > proba[1]);
    }

    #[test]
    fn test_wrong_feature_width() {
        let model = single_layer(vec![1.0, 1.0], 0.0);
        let err = model.predict_proba(&[1.0]).unwrap_err();
        assert!(err.to_string().contains("expects 2 features"));
    }

    #[test]
    fn test_validation_rejects_bad_shapes() {
        let mut model = single_layer(vec![1.0, 1.0], 0.0);
        model.intercepts[0].push(0.0);
        assert!(model.validate().is_err());

        let mut model = single_layer(vec![1.0], 0.0);
        model.classes = vec![1, 2];
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "activation": "tanh",
            "classes": [0, 1],
            "coefs": [[[0.5], [0.25]]],
            "intercepts": [[0.1]]
        }"#;

        let model = MlpClassifier::from_json(json).unwrap();
        assert_eq!(model.name, "mlp");
        assert_eq!(model.out_activation, Activation::Logistic);
        assert_eq!(model.n_features_in(), 2);
    }
}
