//! # Pricing
//!
//! Feature slice serving `POST /predict`: validates a [`FareRequest`], assembles
//! the fixed-order feature vector, runs the shared [`ModelStore`] and answers with
//! a [`FareEstimate`] rounded to cents.
//!
//! The slice only needs a state that can hand out the model:
//!
//! ```rust
//! use fare_model::ModelStore;
//! use utoipa_axum::router::OpenApiRouter;
//!
//! fn api(model: ModelStore) -> axum::Router {
//!     let (router, _openapi) = OpenApiRouter::new().merge(fare_pricing::router()).split_for_parts();
//!     router.with_state(model)
//! }
//! ```

mod dto;
mod error;
mod extract;
mod handler;

pub use crate::dto::{FareEstimate, FareRequest, ValidationErrorBody, ValidationIssue};
pub use crate::error::{PricingError, PricingErrorExt};
pub use crate::extract::ValidatedJson;
pub use crate::handler::round_price;

use axum::extract::FromRef;
use fare_model::ModelStore;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Routes of the pricing slice.
pub fn router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
    ModelStore: FromRef<S>,
{
    OpenApiRouter::new().routes(routes!(handler::predict_fare))
}
