//! Error types for artifact loading and input validation

use std::fmt;
use std::path::PathBuf;

/// Failure to materialize one of the startup artifacts.
#[derive(Debug)]
pub enum ArtifactError {
    /// A required artifact file is absent.
    Missing {
        /// Artifact role (e.g. "preprocessor")
        artifact: &'static str,
        /// Path that was checked
        path: PathBuf,
    },
    /// The file exists but could not be read or is inconsistent.
    Invalid {
        artifact: &'static str,
        path: PathBuf,
        reason: String,
    },
}

impl ArtifactError {
    /// Path of the artifact this error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            ArtifactError::Missing { path, .. } | ArtifactError::Invalid { path, .. } => path,
        }
    }

    /// Whether this is a missing-file condition
    pub fn is_missing(&self) -> bool {
        matches!(self, ArtifactError::Missing { .. })
    }
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::Missing { artifact, path } => {
                let file = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                write!(
                    f,
                    "{} file {} not found at {}",
                    artifact,
                    file,
                    path.display()
                )
            }
            ArtifactError::Invalid {
                artifact,
                path,
                reason,
            } => write!(f, "{} file {} is invalid: {}", artifact, path.display(), reason),
        }
    }
}

impl std::error::Error for ArtifactError {}

/// A customer field value outside its allowed domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainError {
    /// Field name as shown on the form
    pub field: &'static str,
    /// Human readable description of the allowed domain
    pub reason: String,
}

impl DomainError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_names_file() {
        let err = ArtifactError::Missing {
            artifact: "preprocessor",
            path: PathBuf::from("/srv/models/preprocess.json"),
        };

        let msg = err.to_string();
        assert!(msg.contains("preprocess.json"));
        assert!(msg.starts_with("preprocessor"));
        assert!(err.is_missing());
    }

    #[test]
    fn test_domain_error_display() {
        let err = DomainError::new("Age", "must be between 18 and 100");
        assert_eq!(err.to_string(), "Age: must be between 18 and 100");
    }
}
