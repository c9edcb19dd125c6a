//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use blogicum_core::pagination::DEFAULT_PER_PAGE;
use blogicum_infra::{DatabaseConfig, JwtConfig};

#[cfg(feature = "rate-limit")]
use blogicum_infra::RateLimitConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub posts_per_page: u64,
    pub jwt: JwtConfig,
    #[cfg(feature = "rate-limit")]
    pub auth_rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            min_connections: parse_or("DB_MIN_CONNECTIONS", 1),
            connect_timeout: Duration::from_secs(parse_or("DB_CONNECT_TIMEOUT_SECS", 8)),
        });

        let jwt_defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or(jwt_defaults.secret),
            expiration_hours: parse_or("JWT_EXPIRATION_HOURS", jwt_defaults.expiration_hours),
            issuer: env::var("JWT_ISSUER").unwrap_or(jwt_defaults.issuer),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            database,
            posts_per_page: parse_or("POSTS_PER_PAGE", DEFAULT_PER_PAGE).max(1),
            jwt,
            #[cfg(feature = "rate-limit")]
            auth_rate_limit: RateLimitConfig {
                max_requests: parse_or("AUTH_RATE_LIMIT_MAX_REQUESTS", 20),
                window: Duration::from_secs(parse_or("AUTH_RATE_LIMIT_WINDOW_SECS", 60)),
            },
        }
    }
}

/// Parse `key`, falling back to `default` when unset or malformed.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(%key, value = %raw, "Ignoring malformed configuration value");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_falls_back() {
        // Names no real deployment sets.
        assert_eq!(parse_or::<u16>("BLOGICUM_TEST_UNSET_PORT", 8080), 8080);
    }
}
