// main.rs only boots the router and server

mod handlers;
mod models;
mod router;
mod state;
mod templates;

#[cfg(test)]
mod tests;

use anyhow::Context;
use clap::Parser;
use policy_clerk::{logging, AppConfig, Clerk};
use state::AppState;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "clerk-web")]
#[command(about = "Upload, review and send insurance policies")]
struct Args {
    /// Overrides server.port and PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = logging::init_logging();
    let args = Args::parse();

    let config = AppConfig::load().context("loading configuration")?;
    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", config.server.bind_address, port);

    let clerk = Clerk::from_config(config).context("connecting services")?;
    let app = router::app_router(AppState { clerk: Arc::new(clerk) });

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;

    info!("Web server listening on {} (visit http://127.0.0.1:{})", bind_addr, port);
    axum::serve(listener, app).await?;
    Ok(())
}
