//! Feature preprocessing for churn model inference.
//!
//! Applies a fitted column transformer (scalers, one-hot encoders and
//! passthrough columns) to a single name-keyed row. Output columns follow
//! the transformer order of the fitted artifact, so the row's own field
//! order never matters.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One cell of an input row: numeric or categorical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Category(String),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Category(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Category(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(v) => write!(f, "{}", v),
            FieldValue::Category(s) => f.write_str(s),
        }
    }
}

/// A single input row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    fields: BTreeMap<String, FieldValue>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn number(&self, column: &str) -> Result<f64> {
        match self.get(column) {
            Some(FieldValue::Number(v)) => Ok(*v),
            Some(FieldValue::Category(s)) => {
                bail!("column {} expects a number, got category {:?}", column, s)
            }
            None => bail!("column {} missing from input row", column),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for FeatureRow {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut row = FeatureRow::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

/// Output of a transform: one row, dense or sparse.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMatrix {
    Dense(Vec<f32>),
    /// Non-zero entries only, `indices` strictly increasing
    Sparse {
        width: usize,
        indices: Vec<usize>,
        values: Vec<f32>,
    },
}

impl FeatureMatrix {
    pub fn width(&self) -> usize {
        match self {
            FeatureMatrix::Dense(v) => v.len(),
            FeatureMatrix::Sparse { width, .. } => *width,
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, FeatureMatrix::Sparse { .. })
    }

    /// Dense feature vector. A dense matrix is returned as-is.
    pub fn into_dense(self) -> Vec<f32> {
        match self {
            FeatureMatrix::Dense(v) => v,
            FeatureMatrix::Sparse {
                width,
                indices,
                values,
            } => {
                let mut dense = vec![0.0; width];
                for (i, v) in indices.into_iter().zip(values) {
                    if let Some(slot) = dense.get_mut(i) {
                        *slot = v;
                    }
                }
                dense
            }
        }
    }
}

/// Behaviour for categories not seen at fit time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    #[default]
    Error,
    /// Encode as all zeros
    Ignore,
}

/// Category dropped from each encoded column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    First,
    /// Drop the first category only for two-category columns
    IfBinary,
}

/// One fitted transformer of the column transformer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnTransform {
    StandardScaler {
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    OneHotEncoder {
        columns: Vec<String>,
        categories: Vec<Vec<FieldValue>>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
        #[serde(default)]
        drop: Option<DropPolicy>,
    },
    Passthrough {
        columns: Vec<String>,
    },
}

impl ColumnTransform {
    pub fn columns(&self) -> &[String] {
        match self {
            ColumnTransform::StandardScaler { columns, .. }
            | ColumnTransform::OneHotEncoder { columns, .. }
            | ColumnTransform::Passthrough { columns } => columns,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.columns().is_empty() {
            bail!("transformer has no columns");
        }

        match self {
            ColumnTransform::StandardScaler {
                columns,
                mean,
                scale,
            } => {
                if mean.len() != columns.len() || scale.len() != columns.len() {
                    bail!(
                        "standard_scaler has {} columns but {} means and {} scales",
                        columns.len(),
                        mean.len(),
                        scale.len()
                    );
                }
                if mean.iter().chain(scale).any(|v| !v.is_finite()) {
                    bail!("standard_scaler statistics must be finite");
                }
            }
            ColumnTransform::OneHotEncoder {
                columns,
                categories,
                ..
            } => {
                if categories.len() != columns.len() {
                    bail!(
                        "one_hot_encoder has {} columns but {} category lists",
                        columns.len(),
                        categories.len()
                    );
                }
                if let Some(pos) = categories.iter().position(|c| c.is_empty()) {
                    bail!("one_hot_encoder column {} has no categories", columns[pos]);
                }
            }
            ColumnTransform::Passthrough { .. } => {}
        }

        Ok(())
    }

    fn dropped_index(drop: Option<DropPolicy>, categories: &[FieldValue]) -> Option<usize> {
        match drop {
            Some(DropPolicy::First) => Some(0),
            Some(DropPolicy::IfBinary) if categories.len() == 2 => Some(0),
            _ => None,
        }
    }

    fn width(&self) -> usize {
        match self {
            ColumnTransform::OneHotEncoder {
                categories, drop, ..
            } => categories
                .iter()
                .map(|cats| {
                    cats.len() - usize::from(Self::dropped_index(*drop, cats).is_some())
                })
                .sum(),
            other => other.columns().len(),
        }
    }

    fn output_names(&self, names: &mut Vec<String>) {
        match self {
            ColumnTransform::OneHotEncoder {
                columns,
                categories,
                drop,
                ..
            } => {
                for (column, cats) in columns.iter().zip(categories) {
                    let dropped = Self::dropped_index(*drop, cats);
                    for (i, cat) in cats.iter().enumerate() {
                        if Some(i) != dropped {
                            names.push(format!("{}_{}", column, cat));
                        }
                    }
                }
            }
            other => names.extend(other.columns().iter().cloned()),
        }
    }

    /// Append this transformer's output columns to `out`.
    fn apply(&self, row: &FeatureRow, out: &mut Vec<f32>) -> Result<()> {
        match self {
            ColumnTransform::StandardScaler {
                columns,
                mean,
                scale,
            } => {
                for ((column, &mu), &sigma) in columns.iter().zip(mean).zip(scale) {
                    let value = row.number(column)?;
                    // constant feature at fit time
                    let sigma = if sigma == 0.0 { 1.0 } else { sigma };
                    out.push(((value - mu) / sigma) as f32);
                }
            }
            ColumnTransform::OneHotEncoder {
                columns,
                categories,
                handle_unknown,
                drop,
            } => {
                for (column, cats) in columns.iter().zip(categories) {
                    let value = row
                        .get(column)
                        .with_context(|| format!("column {} missing from input row", column))?;
                    let position = cats.iter().position(|c| c == value);
                    if position.is_none() && *handle_unknown == HandleUnknown::Error {
                        bail!("unknown category {:?} in column {}", value.to_string(), column);
                    }

                    let dropped = Self::dropped_index(*drop, cats);
                    for i in 0..cats.len() {
                        if Some(i) == dropped {
                            continue;
                        }
                        out.push(if Some(i) == position { 1.0 } else { 0.0 });
                    }
                }
            }
            ColumnTransform::Passthrough { columns } => {
                for column in columns {
                    out.push(row.number(column)? as f32);
                }
            }
        }

        Ok(())
    }
}

/// Fitted feature preprocessor mapping a customer row to model inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePreprocessor {
    transformers: Vec<ColumnTransform>,
    /// Emit a sparse row instead of a dense one
    #[serde(default)]
    sparse_output: bool,
}

impl FeaturePreprocessor {
    /// Create a preprocessor from fitted transformers.
    pub fn new(transformers: Vec<ColumnTransform>, sparse_output: bool) -> Result<Self> {
        let preprocessor = Self {
            transformers,
            sparse_output,
        };
        preprocessor.validate()?;
        Ok(preprocessor)
    }

    /// Parse and validate a JSON export.
    pub fn from_json(json: &str) -> Result<Self> {
        let preprocessor: Self =
            serde_json::from_str(json).context("Failed to parse preprocessor JSON")?;
        preprocessor.validate()?;
        Ok(preprocessor)
    }

    pub fn validate(&self) -> Result<()> {
        if self.transformers.is_empty() {
            bail!("preprocessor has no transformers");
        }
        for (i, transformer) in self.transformers.iter().enumerate() {
            transformer
                .validate()
                .with_context(|| format!("transformer #{}", i))?;
        }
        Ok(())
    }

    pub fn sparse_output(&self) -> bool {
        self.sparse_output
    }

    /// Width of the produced feature vector.
    pub fn n_features_out(&self) -> usize {
        self.transformers.iter().map(ColumnTransform::width).sum()
    }

    /// Output column names, e.g. `Age` or `Geography_France`.
    pub fn feature_names_out(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_features_out());
        for transformer in &self.transformers {
            transformer.output_names(&mut names);
        }
        names
    }

    /// Transform a single row.
    pub fn transform(&self, row: &FeatureRow) -> Result<FeatureMatrix> {
        let mut features = Vec::with_capacity(self.n_features_out());
        for transformer in &self.transformers {
            transformer.apply(row, &mut features)?;
        }

        if !self.sparse_output {
            return Ok(FeatureMatrix::Dense(features));
        }

        let width = features.len();
        let (indices, values) = features
            .into_iter()
            .enumerate()
            .filter(|(_, v)| *v != 0.0)
            .unzip();
        Ok(FeatureMatrix::Sparse {
            width,
            indices,
            values,
        })
    }
}
