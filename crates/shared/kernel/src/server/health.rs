use axum::extract::State;
use axum::http::header;
use axum::{Json, response::IntoResponse};
use fare_derive::{api_handler, api_model};
use fare_domain::constants::SYSTEM_TAG;
use fare_model::ModelStore;
use std::sync::LazyLock;
use std::time::Instant;

static SERVING_SINCE: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_model]
/// Liveness report
struct HealthResponse {
    /// `up` while requests are served
    status: &'static str,
    /// Server build version
    version: &'static str,
    /// `name@version` of the model answering predictions
    model: String,
    /// Seconds since the router was built
    uptime: u64,
}

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Service is up with a model loaded", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(model): State<ModelStore>) -> impl IntoResponse {
    let metadata = model.metadata();
    let report = HealthResponse {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        model: format!("{}@{}", metadata.name, metadata.version),
        uptime: SERVING_SINCE.elapsed().as_secs(),
    };

    let no_store = [
        (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
        (header::PRAGMA, "no-cache"),
    ];
    (no_store, Json(report))
}

/// Starts the uptime clock.
pub(super) fn mark_start() {
    LazyLock::force(&SERVING_SINCE);
}
