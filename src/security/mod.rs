//! Admission control.
//!
//! # Design Decisions
//! - Rolling-window counting per client identifier, not fixed buckets
//! - Client identity: first `x-forwarded-for` entry, else peer IP
//! - Per-key map guard makes filter-then-append atomic per client

pub mod rate_limit;

pub use rate_limit::{client_key, rate_limit_middleware, RateLimiter};
