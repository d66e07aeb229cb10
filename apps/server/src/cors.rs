use anyhow::{Context, Result};
use axum::http::HeaderValue;
use fare_kernel::domain::config::CorsConfig;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

const ANY_ORIGIN: &str = "*";

/// Builds the cross-origin layer.
///
/// Methods and headers are always mirrored from the preflight. Origins are
/// mirrored too unless `allowed_origins` names a fixed list; `*` in that list
/// also means "mirror".
pub(crate) fn layer(cfg: &CorsConfig) -> Result<CorsLayer> {
    let mirror = cfg.allowed_origins.is_empty() || cfg.allowed_origins.iter().any(|o| o == ANY_ORIGIN);
    let origin = if mirror {
        AllowOrigin::mirror_request()
    } else {
        let origins = cfg
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid CORS origin '{origin}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    let layer = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(cfg.allow_credentials);

    Ok(match cfg.max_age_seconds {
        Some(seconds) => layer.max_age(Duration::from_secs(seconds)),
        None => layer,
    })
}
