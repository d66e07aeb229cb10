use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use fare_kernel::domain::config::{ApiConfig, SslConfig};
use fare_model::{Estimator, FORMAT_VERSION, LinearModel, ModelArtifact, ModelMetadata, ModelStore};
use fare_server::Server;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

fn shipped_model() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models/fare_model.json")
}

fn config_with_model(path: impl Into<PathBuf>) -> ApiConfig {
    let mut cfg = ApiConfig::default();
    cfg.model.path = path.into();
    cfg
}

fn app() -> Router {
    Server::builder().config(config_with_model(shipped_model())).build().unwrap().router()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, bytes.to_vec())
}

fn predict_request(body: &Value) -> Request<Body> {
    Request::post("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn predicts_with_the_shipped_model() {
    let body = json!({
        "distance_km": 5.0, "passenger_count": 1, "hour": 14,
        "day_of_week": 2, "is_weekend": 0, "is_night": 0
    });
    let (status, _, bytes) = send(app(), predict_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "estimated_price": 12.4 }));
}

#[tokio::test]
async fn missing_distance_is_unprocessable() {
    let body = json!({
        "passenger_count": 1, "hour": 14, "day_of_week": 2, "is_weekend": 0, "is_night": 0
    });
    let (status, _, bytes) = send(app(), predict_request(&body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["detail"][0]["loc"], json!(["body"]));
}

#[tokio::test]
async fn hour_out_of_range_still_predicts() {
    let body = json!({
        "distance_km": 5.0, "passenger_count": 1, "hour": 27,
        "day_of_week": 2, "is_weekend": 0, "is_night": 0
    });
    let (status, _, bytes) = send(app(), predict_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["estimated_price"].as_f64().is_some_and(f64::is_finite));
}

#[tokio::test]
async fn cors_preflight_mirrors_any_origin_with_credentials() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/predict")
        .header(header::ORIGIN, "https://dashboard.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://dashboard.example");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
}

#[tokio::test]
async fn restricted_cors_ignores_unlisted_origins() {
    let mut cfg = config_with_model(shipped_model());
    cfg.cors.allowed_origins = vec!["https://allowed.example".to_owned()];
    let app = Server::builder().config(cfg).build().unwrap().router();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/predict")
        .header(header::ORIGIN, "https://other.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(app, request).await;

    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn openapi_document_and_docs_are_served() {
    let (status, _, bytes) =
        send(app(), Request::get("/openapi.json").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let doc: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(doc["info"]["title"], "Fare Prediction API");
    for path in ["/predict", "/health", "/model"] {
        assert!(doc["paths"].get(path).is_some(), "{path} missing from the document");
    }

    let (status, _, _) = send(app(), Request::get("/docs").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn model_route_reports_the_loaded_artifact() {
    let (status, _, bytes) =
        send(app(), Request::get("/model").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let info: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(info["name"], "nyc-taxi-fare");
    assert_eq!(info["kind"], "gradient_boosting");
    assert_eq!(info["format"], "json");
    assert!(info["path"].as_str().unwrap().ends_with("fare_model.json"));
    assert_eq!(info["n_features"], 6);
}

#[tokio::test]
async fn injected_model_skips_loading() {
    let artifact = ModelArtifact::new(
        ModelMetadata::new("flat-rate", "1"),
        Estimator::Linear(LinearModel { coefficients: vec![0.0; 6], intercept: 9.999 }),
    );
    let model = ModelStore::from_artifact(artifact).unwrap();
    let server = Server::builder()
        .config(config_with_model("does/not/exist.json"))
        .model(model)
        .build()
        .unwrap();

    let body = json!({
        "distance_km": 1, "passenger_count": 1, "hour": 1,
        "day_of_week": 1, "is_weekend": 1, "is_night": 1
    });
    let (status, _, bytes) = send(server.router(), predict_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["estimated_price"], 10.0);
}

#[test]
fn missing_model_prevents_startup() {
    let dir = TempDir::new().unwrap();
    let err = Server::builder()
        .config(config_with_model(dir.path().join("absent.json")))
        .build()
        .unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"), "{err:#}");
}

#[test]
fn incompatible_artifact_prevents_startup() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.json");
    let mut artifact = ModelArtifact::new(
        ModelMetadata::new("future", "9"),
        Estimator::Linear(LinearModel { coefficients: vec![1.0; 6], intercept: 0.0 }),
    );
    artifact.format_version = FORMAT_VERSION + 1;
    std::fs::write(&path, artifact.to_json().unwrap()).unwrap();

    let err = Server::builder().config(config_with_model(path)).build().unwrap_err();
    assert!(format!("{err:#}").contains("format version 2"), "{err:#}");
}

#[test]
fn missing_tls_files_prevent_startup() {
    let mut cfg = config_with_model(shipped_model());
    cfg.server.ssl = Some(SslConfig {
        cert: PathBuf::from("/nonexistent/cert.pem"),
        key: PathBuf::from("/nonexistent/key.pem"),
    });

    let err = Server::builder().config(cfg).build().unwrap_err();
    assert!(err.to_string().contains("SSL certificate not found"));
}
