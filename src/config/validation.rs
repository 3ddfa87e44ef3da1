//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (window and limit must be non-zero)
//! - Check the search endpoint is an absolute http/https URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic validation failure.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// The rate-limit window must be non-zero.
    ZeroWindow,
    /// The rate-limit maximum must be non-zero.
    ZeroMaxRequests,
    /// The search endpoint must be an absolute http/https URL.
    InvalidSearchUrl(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::ZeroWindow => write!(f, "rate_limit.window_secs must be > 0"),
            ValidationError::ZeroMaxRequests => write!(f, "rate_limit.max_requests must be > 0"),
            ValidationError::InvalidSearchUrl(url) => {
                write!(f, "upstream.search_url is not an absolute http(s) URL: {}", url)
            }
        }
    }
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroWindow);
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroMaxRequests);
    }
    match Url::parse(&config.upstream.search_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidSearchUrl(
            config.upstream.search_url.clone(),
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
