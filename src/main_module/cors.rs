//! CORS policy for the API.

use axum::http::{header, HeaderValue, Method};
use log::{info, warn};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Builds a CORS layer admitting exactly `origins`.
///
/// Returns `None` when no usable origin is configured; the router then
/// answers same-origin requests only.
pub fn create_cors_layer_with_origins(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) if o != "*" => Some(value),
            _ => {
                warn!("Ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }
    info!("CORS enabled for {} origin(s)", allowed.len());

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(Duration::from_secs(7200)),
    )
}
