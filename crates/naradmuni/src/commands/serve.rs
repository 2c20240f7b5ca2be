use anyhow::{Context, Result};
use naradmuni_core::config::Config;
use naradmuni_core::relay::ChatRelay;
use tokio::net::TcpListener;
use tracing::info;

use crate::server::{self, AppState};

pub async fn execute(host: Option<String>, port: Option<u16>, config: &Config) -> Result<()> {
    let relay = ChatRelay::new(&config.relay).context("Failed to initialize chat relay")?;
    let state = AppState::new(relay, &config.relay);
    let app = server::build_router(state, &config.server);

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .context(format!("Failed to bind {host}:{port}"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    // An Err here means no signal handler could be installed; the pending
    // future then never resolves and the server runs until killed.
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    } else {
        std::future::pending::<()>().await;
    }
}
