//! HTTP surface of the proxy.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all route, trace layer)
//!     → proxy::forward (headers, credential, upstream exchange)
//!     → response relayed to client
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
