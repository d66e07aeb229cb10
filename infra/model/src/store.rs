use crate::artifact::{ArtifactFormat, ModelArtifact, ModelMetadata};
use crate::error::{ModelError, ModelErrorExt};
use crate::estimator::Regressor;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Where the loaded model came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    File { path: PathBuf, format: ArtifactFormat },
    InMemory,
}

#[derive(Debug)]
struct StoreInner {
    metadata: ModelMetadata,
    source: ModelSource,
    regressor: Box<dyn Regressor>,
}

/// The single loaded model, shared read-only by all requests.
///
/// Cloning is cheap; every clone points at the same regressor.
#[derive(Debug, Clone)]
pub struct ModelStore {
    inner: Arc<StoreInner>,
}

impl ModelStore {
    /// Reads, decodes and validates the artifact at `path`.
    ///
    /// The encoding is picked from the extension: `.json` is JSON, anything
    /// else is `postcard`.
    ///
    /// # Errors
    /// * [`ModelError::Io`] when the file cannot be read.
    /// * [`ModelError::Json`] / [`ModelError::Postcard`] for corrupt content.
    /// * [`ModelError::IncompatibleVersion`] for an unsupported layout revision.
    /// * [`ModelError::Invalid`] for unusable parameters.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let format = ArtifactFormat::from_path(path);
        let location = format!("Loading model from {}", path.display());

        let bytes = fs::read(path).context(location.clone())?;
        let artifact = ModelArtifact::decode(&bytes, format).context(location.clone())?;
        artifact.validate().context(location)?;

        let store = Self::from_artifact_with_source(
            artifact,
            ModelSource::File { path: path.to_path_buf(), format },
        );
        info!(
            path = %path.display(),
            %format,
            name = %store.metadata().name,
            version = %store.metadata().version,
            kind = store.kind(),
            n_features = store.n_features(),
            "Model loaded"
        );
        Ok(store)
    }

    /// Wraps an already decoded artifact.
    ///
    /// # Errors
    /// Returns [`ModelError::Invalid`] if the artifact fails validation.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.validate()?;
        Ok(Self::from_artifact_with_source(artifact, ModelSource::InMemory))
    }

    /// Serves an arbitrary regressor, e.g. a test double.
    pub fn from_regressor(metadata: ModelMetadata, regressor: impl Regressor + 'static) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                metadata,
                source: ModelSource::InMemory,
                regressor: Box::new(regressor),
            }),
        }
    }

    fn from_artifact_with_source(artifact: ModelArtifact, source: ModelSource) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                metadata: artifact.metadata,
                source,
                regressor: Box::new(artifact.estimator),
            }),
        }
    }

    /// Predicts the target for one sample.
    ///
    /// # Errors
    /// * [`ModelError::ShapeMismatch`] when `features` has the wrong length.
    /// * [`ModelError::NonFinite`] when the model yields NaN or infinity.
    /// * Any error raised by the regressor itself.
    pub fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(ModelError::ShapeMismatch { expected, found: features.len() });
        }

        let value = self.inner.regressor.predict(features)?;
        if !value.is_finite() {
            return Err(ModelError::NonFinite { value });
        }
        debug!(value, "Model prediction");
        Ok(value)
    }

    #[must_use]
    pub fn metadata(&self) -> &ModelMetadata {
        &self.inner.metadata
    }

    #[must_use]
    pub fn source(&self) -> &ModelSource {
        &self.inner.source
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.inner.regressor.kind()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.inner.regressor.n_features()
    }
}
