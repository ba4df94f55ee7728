//! Storefront API forwarding proxy.
//!
//! A transparent forwarding proxy that fronts exactly one upstream
//! endpoint. Every inbound request, regardless of method or sub-path,
//! is rewritten for the upstream origin and relayed with timeout and
//! error-normalization policy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌───────────────────────────────────────────┐
//!     ─────────────────────▶│  http::server (Axum, catch-all route)     │
//!                           │        │                                  │
//!                           │        ▼                                  │
//!                           │  proxy::forward                           │
//!                           │    ├─ config       upstream URL, per      │
//!                           │    │               request                │
//!                           │    ├─ credentials  bearer header, then    │
//!                           │    │               jwt/token/auth_token   │
//!                           │    ├─ headers      hop-by-hop filter,     │
//!                           │    │               x-forwarded-*          │
//!                           │    └─ client       reqwest, bounded       │
//!                           │                    exchange, no redirects │
//!     Client Response       │        │                                  │
//!     ◀─────────────────────│  relay stream / JSON error envelope       │
//!                           └───────────────────────────────────────────┘
//! ```
//!
//! Failure policy: configuration problems answer 500, timeouts 504,
//! other transport failures 502, and non-2xx upstream responses
//! without JSON bodies are rewritten into a bounded JSON envelope.
//! Everything else streams through untouched.

pub mod config;
pub mod error;
pub mod http;
pub mod proxy;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
