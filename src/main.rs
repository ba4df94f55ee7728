//! Binary entry point: load configuration, bind the listener, serve.

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_proxy::config::{self, ProxyConfig};
use api_proxy::http::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("api-proxy v0.1.0 starting");

    let config = ProxyConfig::from_env();

    // The upstream endpoint is re-read per request; a missing value
    // only downgrades requests to structured 500s, so warn and serve.
    match config.upstream.base_url() {
        Some(url) if !url.is_empty() => {
            tracing::info!(upstream = %url, "Upstream endpoint configured");
        }
        _ => {
            tracing::warn!(
                "{} is not set; requests will fail with 500 until it is provided",
                config::API_BASE_URL_VAR
            );
        }
    }

    tracing::info!(
        bind_address = %config.bind_address,
        upstream_timeout_secs = config.upstream_timeout.as_secs(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
