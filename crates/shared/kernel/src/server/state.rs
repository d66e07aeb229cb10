use axum::extract::FromRef;
use fare_domain::config::ApiConfig;
use fare_model::ModelStore;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[fare_derive::fare_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub model: ModelStore,
}

/// Shared application state; handlers extract its parts through [`FromRef`].
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for ModelStore {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.model.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    model: Option<ModelStore>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn model(mut self, model: ModelStore) -> Self {
        self.model = Some(model);
        self
    }

    /// Finalizes the state. The configuration falls back to defaults; the model is required.
    ///
    /// # Errors
    /// Returns [`ApiStateError::Validation`] when no model was provided.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let model = self.model.ok_or_else(|| ApiStateError::Validation {
            message: "ModelStore not provided".into(),
            context: None,
        })?;
        let config = self.config.unwrap_or_default();

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, model }) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fare_model::{Estimator, LinearModel, ModelArtifact, ModelMetadata};

    #[test]
    fn build_requires_a_model() {
        let err = ApiState::builder().config(ApiConfig::default()).build().unwrap_err();
        assert!(err.to_string().contains("ModelStore not provided"));
    }

    #[test]
    fn parts_are_extractable() {
        let artifact = ModelArtifact::new(
            ModelMetadata::new("lin", "1"),
            Estimator::Linear(LinearModel { coefficients: vec![1.0], intercept: 0.0 }),
        );
        let state =
            ApiState::builder().model(ModelStore::from_artifact(artifact).unwrap()).build().unwrap();

        assert_eq!(ApiConfig::from_ref(&state).server.port, 8000);
        assert_eq!(ModelStore::from_ref(&state).metadata().name, "lin");
    }
}
