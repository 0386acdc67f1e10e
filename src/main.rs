use dotenvy::dotenv;
use log::{error, info};

use complyserver::core::config::AppConfig;
use complyserver::main_module::{build_app_state, init_logging, run_axum_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    info!("Starting complyserver {}...", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().map_err(|e| {
        error!("{e}");
        e
    })?;
    info!(
        "Server configured to listen on {}:{}",
        config.server.host, config.server.port
    );

    let state = build_app_state(config).await?;
    run_axum_server(state).await?;

    info!("Server stopped");
    Ok(())
}
