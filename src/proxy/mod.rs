//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Validated target URL (+ method, headers, body)
//!     → headers.rs (outbound sanitization)
//!     → forwarder.rs (one upstream attempt, no retries)
//!     → content-type branch:
//!         text/html  → buffer → rewrite::html → 200 text/html
//!         otherwise  → sanitized headers → streamed body, original status
//! ```

pub mod forwarder;
pub mod headers;
pub mod target;

pub use forwarder::{Forwarder, ProxyRequest};
