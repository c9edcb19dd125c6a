//! Rate limiting port.

use std::time::Duration;

/// Rate limiter keyed by client identity (usually the remote address).
pub trait RateLimiter: Send + Sync {
    /// Count one request for `key` and report whether it may proceed.
    fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// How long the caller should wait before retrying, zero when allowed.
    pub retry_after: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend error: {0}")]
    Backend(String),
}
