use crate::dto::{FareEstimate, FareRequest, ValidationErrorBody};
use crate::error::{PricingError, PricingErrorExt};
use crate::extract::ValidatedJson;
use axum::Json;
use axum::extract::State;
use fare_derive::api_handler;
use fare_domain::constants::PRICING_TAG;
use fare_model::ModelStore;
use tracing::debug;

/// Above this magnitude an `f64` has no cent resolution left to round.
const ROUNDING_LIMIT: f64 = 1e15;

/// Rounds to two decimals, ties to even on the exact binary value (`0.125` → `0.12`,
/// `2.675` → `2.67`, `0.025` → `0.03`).
///
/// The fixed-precision formatter rounds the stored value itself; scaling by 100
/// first would round the product instead.
#[must_use]
pub fn round_price(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= ROUNDING_LIMIT {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

#[api_handler(
    post,
    path = "/predict",
    request_body = FareRequest,
    responses(
        (status = OK, description = "Fare estimate", body = FareEstimate),
        (status = UNPROCESSABLE_ENTITY, description = "Malformed or incomplete request", body = ValidationErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "The model failed to produce a prediction", body = String),
    ),
    tag = PRICING_TAG,
)]
pub(crate) async fn predict_fare(
    State(model): State<ModelStore>,
    ValidatedJson(request): ValidatedJson<FareRequest>,
) -> Result<Json<FareEstimate>, PricingError> {
    let features = request.to_features();
    let raw = model.predict(&features).context("Predicting fare")?;
    let estimate = FareEstimate { estimated_price: round_price(raw) };

    debug!(?features, raw, estimated_price = estimate.estimated_price, "Fare estimated");
    Ok(Json(estimate))
}
