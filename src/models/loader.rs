//! Startup artifact loader

use crate::config::ArtifactsConfig;
use crate::error::ArtifactError;
use crate::models::backend::{BackendKind, ScoringBackend};
use crate::models::mlp::MlpClassifier;
use crate::models::onnx::OnnxNetwork;
use crate::preprocess::FeaturePreprocessor;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Fully resolved artifact file paths
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub preprocessor: PathBuf,
    /// Generic probabilistic classifier
    pub classifier: PathBuf,
    /// Optional neural-network checkpoint, preferred when present
    pub network: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::from_config(dir, &ArtifactsConfig::default())
    }

    /// Configured file names inside `dir`
    pub fn from_config<P: AsRef<Path>>(dir: P, config: &ArtifactsConfig) -> Self {
        let dir = dir.as_ref();
        Self {
            preprocessor: dir.join(&config.preprocessor),
            classifier: dir.join(&config.classifier),
            network: dir.join(&config.network),
        }
    }
}

/// Preprocessor and model ready to serve requests
#[derive(Debug)]
pub struct LoadedArtifacts {
    pub preprocessor: FeaturePreprocessor,
    pub backend: ScoringBackend,
}

/// Loader for the preprocessor and scoring model
pub struct ArtifactLoader {
    paths: ArtifactPaths,
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ArtifactLoader {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            onnx_threads: 1,
        }
    }

    /// Loader for the configured artifact directory
    pub fn from_config(config: &ArtifactsConfig) -> anyhow::Result<Self> {
        let dir = config.resolve_dir()?;
        Ok(Self::new(ArtifactPaths::from_config(dir, config)).with_threads(config.onnx_threads))
    }

    pub fn with_threads(mut self, onnx_threads: usize) -> Self {
        self.onnx_threads = onnx_threads.max(1);
        self
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Decide which backend will be used, checking only file existence.
    ///
    /// Fails on the preprocessor first, before looking at any model file.
    pub fn select_backend(&self) -> Result<BackendKind, ArtifactError> {
        if !self.paths.preprocessor.exists() {
            return Err(ArtifactError::Missing {
                artifact: "preprocessor",
                path: self.paths.preprocessor.clone(),
            });
        }

        if self.paths.network.exists() {
            return Ok(BackendKind::DirectProbability);
        }

        if !self.paths.classifier.exists() {
            return Err(ArtifactError::Missing {
                artifact: "classifier",
                path: self.paths.classifier.clone(),
            });
        }

        Ok(BackendKind::ProbabilisticClassifier)
    }

    /// Load both artifacts, all existence checks first.
    pub fn load(&self) -> Result<LoadedArtifacts, ArtifactError> {
        let kind = self.select_backend()?;

        let preprocessor = self.load_preprocessor()?;
        info!(
            path = %self.paths.preprocessor.display(),
            features_out = preprocessor.n_features_out(),
            "Preprocessor loaded"
        );

        let backend = match kind {
            BackendKind::DirectProbability => self.load_network(&preprocessor)?,
            BackendKind::ProbabilisticClassifier => self.load_classifier(&preprocessor)?,
        };

        info!(
            backend = %backend.kind(),
            model = %backend.model_name(),
            "Scoring backend selected"
        );

        Ok(LoadedArtifacts {
            preprocessor,
            backend,
        })
    }

    fn load_preprocessor(&self) -> Result<FeaturePreprocessor, ArtifactError> {
        let path = &self.paths.preprocessor;
        let json = read_artifact("preprocessor", path)?;
        FeaturePreprocessor::from_json(&json).map_err(|e| invalid("preprocessor", path, e))
    }

    fn load_classifier(
        &self,
        preprocessor: &FeaturePreprocessor,
    ) -> Result<ScoringBackend, ArtifactError> {
        let path = &self.paths.classifier;
        let json = read_artifact("classifier", path)?;
        let model = MlpClassifier::from_json(&json).map_err(|e| invalid("classifier", path, e))?;

        if model.n_features_in() != preprocessor.n_features_out() {
            return Err(ArtifactError::Invalid {
                artifact: "classifier",
                path: path.clone(),
                reason: format!(
                    "expects {} features but the preprocessor produces {}",
                    model.n_features_in(),
                    preprocessor.n_features_out()
                ),
            });
        }

        warn!(
            path = %self.paths.network.display(),
            "Network checkpoint not found, using generic classifier"
        );

        Ok(ScoringBackend::ProbabilisticClassifier(Box::new(model)))
    }

    fn load_network(
        &self,
        preprocessor: &FeaturePreprocessor,
    ) -> Result<ScoringBackend, ArtifactError> {
        let path = &self.paths.network;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "network".to_string());

        let network = OnnxNetwork::load(path, &name, self.onnx_threads)
            .map_err(|e| invalid("network", path, e))?;

        if let Some(width) = network.n_features_in() {
            if width != preprocessor.n_features_out() {
                return Err(ArtifactError::Invalid {
                    artifact: "network",
                    path: path.clone(),
                    reason: format!(
                        "expects {} features but the preprocessor produces {}",
                        width,
                        preprocessor.n_features_out()
                    ),
                });
            }
        }

        Ok(ScoringBackend::DirectProbability(Box::new(network)))
    }
}

fn read_artifact(artifact: &'static str, path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|e| ArtifactError::Invalid {
        artifact,
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn invalid(artifact: &'static str, path: &Path, err: anyhow::Error) -> ArtifactError {
    ArtifactError::Invalid {
        artifact,
        path: path.to_path_buf(),
        reason: format!("{:#}", err),
    }
}
