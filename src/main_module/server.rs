//! HTTP server initialization and routing

use axum::{routing::get, Router};
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::compliance::{configure_compliance_routes, ui::configure_compliance_ui_routes};
use crate::core::session::configure_session_routes;
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::remediation::configure_remediation_routes;

use super::{create_cors_layer_with_origins, health_check, shutdown_signal};

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = create_cors_layer_with_origins(&app_state.config.server.allowed_origins);

    let router = Router::new()
        .route(ApiUrls::HEALTH, get(health_check))
        .merge(configure_session_routes())
        .merge(configure_compliance_routes())
        .merge(configure_remediation_routes())
        .merge(configure_compliance_ui_routes())
        .with_state(app_state);

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };
    router.layer(TraceLayer::new_for_http())
}

pub async fn run_axum_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let host: std::net::IpAddr = app_state
        .config
        .server
        .host
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let addr = SocketAddr::new(host, app_state.config.server.port);

    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                addr, e
            );
            return Err(e);
        }
    };
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}
