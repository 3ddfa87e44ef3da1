//! HTTP server subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → rate-limit middleware (admit or 429)
//!     → fixed route table (server.rs)
//!     → handlers.rs (param extraction + validation)
//!     → proxy::Forwarder (upstream attempt + response shaping)
//! ```

pub mod handlers;
pub mod server;

pub use server::HttpServer;
