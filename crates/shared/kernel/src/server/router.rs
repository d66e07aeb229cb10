use super::{health, model};
use axum::extract::FromRef;
use fare_model::ModelStore;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// `/health` and `/model`, for any state that can hand out the [`ModelStore`].
pub fn system_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
    ModelStore: FromRef<S>,
{
    health::mark_start();

    OpenApiRouter::<S>::new()
        .routes(routes!(health::health_handler))
        .routes(routes!(model::model_handler))
}
