use axum::routing::get;
use axum::{Json, Router};
use fare_kernel::domain::constants::{DOCS_PATH, OPENAPI_PATH};
use fare_kernel::server::{ApiState, system_router};
use std::future::ready;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(
    title = "Fare Prediction API",
    description = "Estimates taxi fares from trip features with a pre-trained regression model."
))]
struct ApiDoc;

pub(crate) fn init(state: ApiState, cors: CorsLayer) -> Router {
    let (api_routes, api_doc) = OpenApiRouter::<ApiState>::with_openapi(ApiDoc::openapi())
        .merge(system_router())
        .merge(fare_pricing::router())
        .split_for_parts();

    let document = api_doc.clone();
    let openapi_json = get(move || ready(Json(document.clone())));

    Router::new()
        .merge(api_routes.with_state(state))
        .route(OPENAPI_PATH, openapi_json)
        .merge(Scalar::with_url(DOCS_PATH, api_doc))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
