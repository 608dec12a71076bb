use std::sync::Arc;

use anyhow::Context;
use provider_console::{ApiConfig, Console, HttpReservationApi, ProcessCache};
use tracing::info;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ApiConfig::from_env().context("loading API configuration")?;
    info!(base_url = %config.base_url, timeout = ?config.timeout, "reservation API configured");

    let api = HttpReservationApi::new(config)?;
    let console = Arc::new(Console::new(api, Arc::new(ProcessCache::new())));
    let app = provider_console::web::router(console);

    let addr = std::env::var("PROVIDER_CONSOLE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "provider console listening");

    axum::serve(listener, app).await?;
    Ok(())
}
