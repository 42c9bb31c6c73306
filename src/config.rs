//! Configuration management for the churn scorer

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Artifact location configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Artifact directory; relative paths resolve against the executable's directory
    pub dir: String,
    /// Preprocessor file name
    pub preprocessor: String,
    /// Generic classifier file name
    pub classifier: String,
    /// Neural-network checkpoint file name (optional artifact)
    pub network: String,
    /// Number of threads for ONNX inference (default: 1)
    pub onnx_threads: usize,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            preprocessor: "preprocess.json".to_string(),
            classifier: "mlp_model.json".to_string(),
            network: "churn_model.onnx".to_string(),
            onnx_threads: 1,
        }
    }
}

impl ArtifactsConfig {
    /// Absolute artifact directory.
    pub fn resolve_dir(&self) -> Result<PathBuf> {
        let dir = Path::new(&self.dir);
        if dir.is_absolute() {
            return Ok(dir.to_path_buf());
        }

        let exe = std::env::current_exe().context("Failed to locate running executable")?;
        let base = exe
            .parent()
            .context("Executable path has no parent directory")?;
        Ok(base.join(dir))
    }
}

/// Form server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the optional config file and `CHURN__*` variables.
    ///
    /// The file path can be overridden with `CHURN_CONFIG`.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CHURN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let config = Config::builder()
            .add_source(File::from(Path::new(&path)).required(false))
            .add_source(Environment::with_prefix("CHURN").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.artifacts.preprocessor, "preprocess.json");
        assert_eq!(config.artifacts.classifier, "mlp_model.json");
        assert_eq!(config.artifacts.network, "churn_model.onnx");
        assert_eq!(config.artifacts.onnx_threads, 1);
        assert_eq!(config.server.bind, "127.0.0.1:8501");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_path_fills_defaults() {
        let path = std::env::temp_dir().join(format!("churn-config-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[artifacts]\ndir = \"/srv/churn/artifacts\"\n\n[logging]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.artifacts.dir, "/srv/churn/artifacts");
        assert_eq!(config.artifacts.classifier, "mlp_model.json");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_relative_dir_resolves_next_to_executable() {
        let config = ArtifactsConfig {
            dir: "artifacts".to_string(),
            ..ArtifactsConfig::default()
        };

        let resolved = config.resolve_dir().unwrap();
        let exe_dir = std::env::current_exe().unwrap().parent().unwrap().to_path_buf();
        assert_eq!(resolved, exe_dir.join("artifacts"));
    }

    #[test]
    fn test_absolute_dir_kept() {
        let dir = std::env::temp_dir();
        let config = ArtifactsConfig {
            dir: dir.to_string_lossy().into_owned(),
            ..ArtifactsConfig::default()
        };
        assert_eq!(config.resolve_dir().unwrap(), dir);
    }
}
