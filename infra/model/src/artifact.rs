use crate::error::ModelError;
use crate::estimator::{Estimator, Regressor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Artifact layout revision this build reads and writes.
pub const FORMAT_VERSION: u16 = 1;

/// On-disk encoding of an artifact, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    /// Human-readable JSON (`.json`).
    Json,
    /// Compact `postcard` binary (any other extension).
    Postcard,
}

impl ArtifactFormat {
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Postcard,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Postcard => "postcard",
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive information recorded by the training pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub version: String,
    /// Feature names in input order; empty when the trainer did not record them.
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub trained_at: Option<String>,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            features: Vec::new(),
            target: None,
            trained_at: None,
        }
    }

    #[must_use]
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }
}

/// A serialized, pre-trained regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u16,
    pub metadata: ModelMetadata,
    pub estimator: Estimator,
}

/// Leading field of every artifact, decoded before the rest so newer layouts are
/// reported as incompatible rather than corrupt.
#[derive(Deserialize)]
struct VersionProbe {
    format_version: u16,
}

impl ModelArtifact {
    #[must_use]
    pub const fn new(metadata: ModelMetadata, estimator: Estimator) -> Self {
        Self { format_version: FORMAT_VERSION, metadata, estimator }
    }

    /// Decodes an artifact in the given encoding.
    ///
    /// # Errors
    /// [`ModelError::IncompatibleVersion`] for an unsupported layout revision,
    /// [`ModelError::Json`] / [`ModelError::Postcard`] for undecodable bytes.
    pub fn decode(bytes: &[u8], format: ArtifactFormat) -> Result<Self, ModelError> {
        match format {
            ArtifactFormat::Json => Self::from_json(bytes),
            ArtifactFormat::Postcard => Self::decode_bin(bytes),
        }
    }

    /// Decodes a JSON artifact.
    ///
    /// # Errors
    /// See [`ModelArtifact::decode`].
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let probe: VersionProbe = serde_json::from_slice(bytes)?;
        check_version(probe.format_version)?;
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encodes the artifact as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns [`ModelError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a `postcard` artifact.
    ///
    /// # Errors
    /// See [`ModelArtifact::decode`].
    pub fn decode_bin(bytes: &[u8]) -> Result<Self, ModelError> {
        let (version, _) = postcard::take_from_bytes::<u16>(bytes)?;
        check_version(version)?;
        Ok(postcard::from_bytes(bytes)?)
    }

    /// Encodes the artifact with `postcard`.
    ///
    /// # Errors
    /// Returns [`ModelError::Postcard`] if serialization fails.
    pub fn encode_bin(&self) -> Result<Vec<u8>, ModelError> {
        Ok(postcard::to_stdvec(self)?)
    }

    /// Checks the estimator parameters and their agreement with the metadata.
    ///
    /// # Errors
    /// Returns [`ModelError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.estimator.validate()?;

        let named = self.metadata.features.len();
        let consumed = self.estimator.n_features();
        if named != 0 && named != consumed {
            return Err(ModelError::invalid(format!(
                "metadata names {named} features but the estimator consumes {consumed}"
            )));
        }
        Ok(())
    }
}

const fn check_version(found: u16) -> Result<(), ModelError> {
    if found == FORMAT_VERSION {
        Ok(())
    } else {
        Err(ModelError::IncompatibleVersion { found, supported: FORMAT_VERSION, context: None })
    }
}
