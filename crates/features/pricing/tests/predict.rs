use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use fare_model::{ModelError, ModelMetadata, ModelStore, Regressor};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Regressor double: records every feature vector and returns a fixed output.
#[derive(Debug, Clone)]
struct Recorder {
    calls: Arc<Mutex<Vec<Vec<f64>>>>,
    output: f64,
    n_features: usize,
}

impl Recorder {
    fn returning(output: f64) -> Self {
        Self { calls: Arc::default(), output, n_features: 6 }
    }

    fn calls(&self) -> Vec<Vec<f64>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Regressor for Recorder {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.calls.lock().unwrap().push(features.to_vec());
        Ok(self.output)
    }

    fn kind(&self) -> &'static str {
        "recorder"
    }
}

fn app(model: &Recorder) -> Router {
    let store = ModelStore::from_regressor(ModelMetadata::new("mock", "0"), model.clone());
    let (router, _) = fare_pricing::router::<ModelStore>().split_for_parts();
    router.with_state(store)
}

fn scenario() -> Value {
    json!({
        "distance_km": 5.0,
        "passenger_count": 1,
        "hour": 14,
        "day_of_week": 2,
        "is_weekend": 0,
        "is_night": 0
    })
}

async fn post_raw(app: Router, content_type: Option<&str>, body: String) -> (StatusCode, Vec<u8>) {
    let mut request = Request::post("/predict");
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    let response = app.oneshot(request.body(Body::from(body)).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn post(app: Router, body: &Value) -> (StatusCode, Value) {
    let (status, bytes) = post_raw(app, Some("application/json"), body.to_string()).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn valid_request_returns_rounded_estimate() {
    let model = Recorder::returning(18.346_8);
    let (status, body) = post(app(&model), &scenario()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "estimated_price": 18.35 }));
    assert_eq!(model.calls(), [vec![5.0, 1.0, 14.0, 2.0, 0.0, 0.0]]);
}

#[tokio::test]
async fn missing_field_is_422_and_skips_the_model() {
    let model = Recorder::returning(10.0);
    let mut body = scenario();
    body.as_object_mut().unwrap().remove("distance_km");

    let (status, body) = post(app(&model), &body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "missing");
    assert_eq!(body["detail"][0]["loc"], json!(["body"]));
    assert!(body["detail"][0]["msg"].as_str().unwrap().contains("distance_km"));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn non_numeric_value_is_422() {
    let model = Recorder::returning(10.0);
    let mut body = scenario();
    body["passenger_count"] = json!("one");

    let (status, body) = post(app(&model), &body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "type_error");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn numeric_strings_are_coerced_before_prediction() {
    let model = Recorder::returning(10.0);
    let mut body = scenario();
    body["distance_km"] = json!("5.0");
    body["passenger_count"] = json!("2");
    body["hour"] = json!("14.0");

    let (status, body) = post(app(&model), &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estimated_price"], 10.0);
    assert_eq!(model.calls(), [vec![5.0, 2.0, 14.0, 2.0, 0.0, 0.0]]);
}

#[tokio::test]
async fn non_numeric_distance_is_422() {
    let model = Recorder::returning(10.0);
    let mut body = scenario();
    body["distance_km"] = json!("five");

    let (status, body) = post(app(&model), &body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "type_error");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn out_of_range_hour_is_passed_through() {
    let model = Recorder::returning(31.5);
    let mut body = scenario();
    body["hour"] = json!(27);

    let (status, body) = post(app(&model), &body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["estimated_price"].is_f64());
    assert!((model.calls()[0][2] - 27.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn key_order_does_not_change_features() {
    let model = Recorder::returning(12.0);
    let reversed = r#"{"is_night":1,"is_weekend":1,"day_of_week":6,"hour":23,"passenger_count":3,"distance_km":12.5}"#;

    let (status, _) = post_raw(app(&model), Some("application/json"), reversed.to_owned()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(model.calls(), [vec![12.5, 3.0, 23.0, 6.0, 1.0, 1.0]]);
}

#[tokio::test]
async fn malformed_json_and_missing_content_type_are_422() {
    let model = Recorder::returning(10.0);

    let (status, bytes) =
        post_raw(app(&model), Some("application/json"), "{\"distance_km\": ".to_owned()).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "json_invalid");

    let (status, bytes) = post_raw(app(&model), None, scenario().to_string()).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "content_type");

    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn identical_payloads_get_identical_estimates() {
    let model = Recorder::returning(7.777);
    let (_, first) = post(app(&model), &scenario()).await;
    let (_, second) = post(app(&model), &scenario()).await;

    assert_eq!(first, second);
    assert_eq!(first["estimated_price"], 7.78);
}

#[tokio::test]
async fn non_finite_prediction_is_500() {
    let model = Recorder::returning(f64::NAN);
    let (status, bytes) =
        post_raw(app(&model), Some("application/json"), scenario().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(bytes, b"Internal Server Error");
}

#[tokio::test]
async fn feature_count_mismatch_is_500() {
    let model = Recorder { n_features: 5, ..Recorder::returning(1.0) };
    let (status, _) = post(app(&model), &scenario()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(model.calls().is_empty());
}

#[test]
fn predict_route_is_documented() {
    let (_, api) = fare_pricing::router::<ModelStore>().split_for_parts();
    let item = api.paths.paths.get("/predict").expect("documented path");
    assert!(item.post.is_some());
}
