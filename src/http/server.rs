//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router: one catch-all route, any method
//! - Wire up middleware (request tracing)
//! - Bind the server to a listener with graceful shutdown
//!
//! All forwarding logic lives in [`crate::proxy::forward`]; this
//! module only assembles the application and owns its state.

use std::sync::Arc;

use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::config::{ProxyConfig, UpstreamSource};
use crate::proxy::client::{ReqwestClient, UpstreamClient};
use crate::proxy::forward::proxy_handler;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    /// Upstream endpoint resolver, consulted per request.
    pub upstream: Arc<dyn UpstreamSource>,
    /// Outbound transport.
    pub client: Arc<dyn UpstreamClient>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server from the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let state = AppState {
            upstream: config.upstream.clone(),
            client: Arc::new(ReqwestClient::new(config.upstream_timeout)),
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router. Every method on every path lands in the
    /// same handler; the proxy has no routes of its own.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
