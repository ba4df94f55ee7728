//! The forwarding subsystem: header policy, credential resolution,
//! the upstream transport capability, and the forward operation
//! itself.
//!
//! # Design Decisions
//! - Exactly one upstream endpoint; inbound sub-paths are discarded
//! - Credentials pass through unverified; the upstream decides trust
//! - No retries: every failure surfaces to the caller once

pub mod client;
pub mod credentials;
pub mod forward;
pub mod headers;

pub use client::{ReqwestClient, TransportError, UpstreamClient, UpstreamResponse};
pub use forward::proxy_handler;
