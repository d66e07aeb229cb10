use axum::Json;
use axum::extract::State;
use fare_derive::{api_handler, api_model};
use fare_domain::constants::SYSTEM_TAG;
use fare_model::{ModelSource, ModelStore};

#[api_model]
/// The model served by this instance
pub struct ModelInfo {
    /// Artifact name
    pub name: String,
    /// Artifact version
    pub version: String,
    /// Feature names in input order, as recorded by the trainer
    pub features: Vec<String>,
    /// Number of features the model consumes
    pub n_features: usize,
    /// Estimator family (`linear`, `random_forest`, `gradient_boosting`)
    pub kind: String,
    /// Artifact encoding (`json`, `postcard`), or `in_memory`
    pub format: String,
    /// Artifact file, absent for injected models
    pub path: Option<String>,
    /// Prediction target, when recorded
    pub target: Option<String>,
    /// Training timestamp, when recorded
    pub trained_at: Option<String>,
}

impl From<&ModelStore> for ModelInfo {
    fn from(store: &ModelStore) -> Self {
        let metadata = store.metadata();
        let (format, path) = match store.source() {
            ModelSource::File { path, format } => {
                (format.as_str(), Some(path.display().to_string()))
            },
            ModelSource::InMemory => ("in_memory", None),
        };

        Self {
            name: metadata.name.clone(),
            version: metadata.version.clone(),
            features: metadata.features.clone(),
            n_features: store.n_features(),
            kind: store.kind().to_owned(),
            format: format.to_owned(),
            path,
            target: metadata.target.clone(),
            trained_at: metadata.trained_at.clone(),
        }
    }
}

#[api_handler(
    get,
    path = "/model",
    responses((status = OK, description = "Loaded model metadata", body = ModelInfo)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn model_handler(State(model): State<ModelStore>) -> Json<ModelInfo> {
    Json(ModelInfo::from(&model))
}
