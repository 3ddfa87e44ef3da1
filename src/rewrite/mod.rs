//! Response body rewriting.
//!
//! # Design Decisions
//! - Textual transforms over the whole document, not a structural HTML parse
//! - Order-sensitive: scripts are stripped first so the link rules never
//!   match inside script bodies
//! - Malformed or unusually quoted markup may not match (accepted
//!   approximation for a best-effort proxy)

pub mod html;
