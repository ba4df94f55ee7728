//! Runtime configuration.
//!
//! # Design Decisions
//! - The upstream endpoint is read per request, not once at startup: a
//!   proxy deployed without `API_BASE_URL` still boots, serves its
//!   listener, and answers every request with a structured 500. Fixing
//!   the environment fixes the proxy without a restart in platforms
//!   that re-resolve env per invocation.
//! - The endpoint resolver is a trait so tests can pin a value. The
//!   process environment is global and cannot be isolated between
//!   concurrently running tests.

use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable naming the upstream endpoint.
pub const API_BASE_URL_VAR: &str = "API_BASE_URL";

/// Environment variable for the inbound listener address.
pub const LISTEN_ADDR_VAR: &str = "LISTEN_ADDR";

/// Budget for one full upstream exchange, connect through final body
/// byte.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Supplies the upstream base URL, consulted once per request.
pub trait UpstreamSource: Send + Sync {
    /// The configured upstream endpoint, if any.
    fn base_url(&self) -> Option<String>;
}

/// Reads `API_BASE_URL` from the process environment on every call.
pub struct EnvSource;

impl UpstreamSource for EnvSource {
    fn base_url(&self) -> Option<String> {
        env::var(API_BASE_URL_VAR).ok()
    }
}

/// A fixed upstream value, used by tests and embedding callers.
pub struct StaticSource(pub Option<String>);

impl UpstreamSource for StaticSource {
    fn base_url(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Top-level proxy configuration.
#[derive(Clone)]
pub struct ProxyConfig {
    /// Address the inbound listener binds to.
    pub bind_address: String,
    /// Upstream endpoint resolver.
    pub upstream: Arc<dyn UpstreamSource>,
    /// Timeout covering the entire upstream exchange.
    pub upstream_timeout: Duration,
}

impl ProxyConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        let bind_address = env::var(LISTEN_ADDR_VAR).unwrap_or_else(|_| {
            tracing::info!("{LISTEN_ADDR_VAR} not set, using default {DEFAULT_LISTEN_ADDR}");
            DEFAULT_LISTEN_ADDR.to_string()
        });

        Self {
            bind_address,
            upstream: Arc::new(EnvSource),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}
