//! ONNX neural-network checkpoint returning the churn probability directly

use crate::models::backend::DirectProbabilityModel;
use anyhow::{anyhow, bail, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// ONNX Runtime session with resolved input/output names
pub struct OnnxNetwork {
    name: String,
    /// Running a session needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    /// Last input dimension when the graph fixes it
    n_features_in: Option<usize>,
}

impl OnnxNetwork {
    /// Load a network from file
    pub fn load<P: AsRef<Path>>(path: P, name: &str, intra_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        ort::init().commit()?;
        info!(model = %name, path = %path.display(), threads = intra_threads, "Loading ONNX network");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load network from {}", path.display()))?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| anyhow!("network has no inputs"))?;
        let input_name = input.name.clone();
        // symbolic or dynamic dimensions are reported as non-positive
        let n_features_in = input
            .input_type
            .tensor_shape()
            .and_then(|shape| shape.last().copied())
            .filter(|&dim| dim > 0)
            .map(|dim| dim as usize);

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| anyhow!("network has no outputs"))?;

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            features_in = ?n_features_in,
            "Network loaded successfully"
        );

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            output_name,
            n_features_in,
        })
    }

    /// Feature width the network expects, if its input shape is fixed
    pub fn n_features_in(&self) -> Option<usize> {
        self.n_features_in
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}

impl DirectProbabilityModel for OnnxNetwork {
    fn predict(&self, features: &[f32]) -> Result<f64> {
        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| anyhow!("output {} missing from run results", self.output_name))?;
        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .with_context(|| format!("output {} is not a float tensor", self.output_name))?;

        if data.len() != 1 {
            bail!(
                "{} produced {} values (shape {:?}), expected a single probability",
                self.name,
                data.len(),
                shape
            );
        }

        let probability = data[0] as f64;
        debug!(model = %self.name, probability = probability, "Network inference complete");
        Ok(probability)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
