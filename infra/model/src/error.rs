use std::borrow::Cow;

/// Failures while loading an artifact or running inference.
#[fare_derive::fare_error]
pub enum ModelError {
    /// The artifact file could not be read.
    #[error("Model artifact I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// The JSON artifact could not be decoded.
    #[error("Corrupt JSON model artifact{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// The binary artifact could not be decoded.
    #[error("Corrupt binary model artifact{}: {source}", format_context(.context))]
    Postcard { source: postcard::Error, context: Option<Cow<'static, str>> },

    /// The artifact was written by an unsupported format revision.
    #[error(
        "Incompatible model artifact{}: format version {found}, supported {supported}",
        format_context(.context)
    )]
    IncompatibleVersion { found: u16, supported: u16, context: Option<Cow<'static, str>> },

    /// The artifact decoded but its parameters are unusable.
    #[error("Invalid model{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The feature vector length does not match the model.
    #[error("Feature shape mismatch: model expects {expected} features, got {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// The model produced NaN or an infinite value.
    #[error("Model produced a non-finite prediction: {value}")]
    NonFinite { value: f64 },
}

impl ModelError {
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Invalid { message: message.into(), context: None }
    }
}
