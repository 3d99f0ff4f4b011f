use crate::application::artifact::{ARTIFACT_FORMAT_VERSION, ArtifactBundle};
use crate::domain::errors::ArtifactError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// JSON file holding one [`ArtifactBundle`]
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn save(&self, bundle: &ArtifactBundle) -> Result<(), ArtifactError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ArtifactError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string(bundle).map_err(|e| ArtifactError::Corrupt {
            path: self.path.clone(),
            reason: format!("serialization failed: {}", e),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(|source| ArtifactError::Io {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| ArtifactError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!("Saved model artifact to {:?}", self.path);
        Ok(())
    }

    pub fn load(&self) -> Result<ArtifactBundle, ArtifactError> {
        if !self.path.exists() {
            return Err(ArtifactError::NotFound {
                path: self.path.clone(),
            });
        }

        let content = fs::read_to_string(&self.path).map_err(|source| ArtifactError::Io {
            path: self.path.clone(),
            source,
        })?;

        // Check the version before the full decode so old bundles get a clear message
        let header: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;
        let found = header
            .get("format_version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| self.corrupt("missing format_version".to_string()))?;
        if found != u64::from(ARTIFACT_FORMAT_VERSION) {
            return Err(ArtifactError::UnsupportedVersion {
                found: u32::try_from(found).unwrap_or(u32::MAX),
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }

        let bundle: ArtifactBundle =
            serde_json::from_value(header).map_err(|e| self.corrupt(e.to_string()))?;
        bundle
            .model
            .validate()
            .map_err(|e| self.corrupt(e.to_string()))?;
        bundle
            .check_consistency()
            .map_err(|e| self.corrupt(e.to_string()))?;

        info!(
            "Loaded model artifact from {:?} (window {}, classes {:?}, created {})",
            self.path,
            bundle.window_length,
            bundle.codec.classes(),
            bundle.created_at
        );
        Ok(bundle)
    }

    fn corrupt(&self, reason: String) -> ArtifactError {
        ArtifactError::Corrupt {
            path: self.path.clone(),
            reason,
        }
    }
}
