//! Link-rewriting web proxy library.

pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod proxy;
pub mod rewrite;
pub mod security;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
