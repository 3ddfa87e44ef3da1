//! Observability subsystem.
//!
//! Structured logging is initialized in `main` via `tracing-subscriber`;
//! this module carries the metrics surface.

pub mod metrics;
