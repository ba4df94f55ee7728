//! Shared utilities for integration testing: mock upstreams and a
//! proxy spawner with a pinned upstream endpoint.

// Each integration binary compiles this module separately and uses a
// different subset of it.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::Request;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use api_proxy::config::{ProxyConfig, StaticSource};
use api_proxy::http::HttpServer;

/// One request as observed by a recording upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Requests captured by a recording upstream, in arrival order.
pub type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

/// Serve the given router on an ephemeral port and return its address.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Start a mock upstream that records every request and answers with
/// the given responder.
pub async fn start_recording_upstream<F>(respond: F) -> (SocketAddr, Recorded)
where
    F: Fn() -> Response + Clone + Send + Sync + 'static,
{
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = recorded.clone();

    let handler = move |request: Request| {
        let sink = sink.clone();
        let respond = respond.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
            sink.lock().unwrap().push(RecordedRequest {
                method: parts.method.to_string(),
                path: parts.uri.path().to_string(),
                query: parts.uri.query().map(str::to_string),
                headers: parts.headers,
                body,
            });
            respond()
        }
    };

    let router = Router::new()
        .route("/{*path}", any(handler.clone()))
        .route("/", any(handler));

    let addr = serve(router).await;
    (addr, recorded)
}

/// Start a mock upstream that answers only after the given delay.
pub async fn start_slow_upstream(delay: Duration) -> SocketAddr {
    let handler = move || async move {
        tokio::time::sleep(delay).await;
        "late"
    };
    let router = Router::new()
        .route("/{*path}", any(handler.clone()))
        .route("/", any(handler));
    serve(router).await
}

/// Start a raw-TCP upstream that answers every connection with the
/// exact bytes given. Used where response headers must be controlled
/// beyond what a framework server will emit.
pub async fn start_raw_upstream(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        // Drain the request before answering.
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a raw-TCP upstream that advertises a long body but closes
/// early, breaking the stream mid-response.
pub async fn start_truncating_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        // Drain the request before answering.
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let partial = "HTTP/1.1 500 Internal Server Error\r\n\
                                       Content-Type: text/html\r\n\
                                       Content-Length: 4096\r\n\
                                       Connection: close\r\n\r\n<html>partial";
                        let _ = socket.write_all(partial.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Spawn the proxy on an ephemeral port with a pinned upstream value
/// and exchange timeout; returns the proxy's address.
pub async fn start_proxy(upstream: Option<String>, timeout: Duration) -> SocketAddr {
    let config = ProxyConfig {
        bind_address: "127.0.0.1:0".to_string(),
        upstream: Arc::new(StaticSource(upstream)),
        upstream_timeout: timeout,
    };

    let listener = TcpListener::bind(config.bind_address.as_str())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    tokio::spawn(async move {
        server.run(listener).await.unwrap();
    });

    addr
}

/// Default-timeout variant for tests that never hit the budget.
pub async fn start_proxy_to(upstream_base: &str) -> SocketAddr {
    start_proxy(
        Some(upstream_base.to_string()),
        api_proxy::config::DEFAULT_UPSTREAM_TIMEOUT,
    )
    .await
}

/// Test client that never follows redirects or deployment proxies.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
