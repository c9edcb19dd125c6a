//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::ports::{PasswordService, RateLimiter, Repositories, TokenService};
use blogicum_core::services::{AccountService, CommentService, PostQueries, PostService};
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use blogicum_infra::DatabaseConnections;

#[cfg(feature = "rate-limit")]
use blogicum_infra::InMemoryRateLimiter;

use crate::config::AppConfig;

/// Failures while wiring the application together.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database unavailable: {0}")]
    Database(String),

    #[cfg(not(feature = "postgres"))]
    #[error("DATABASE_URL is set but the server was built without the postgres feature")]
    PostgresDisabled,

    #[error("rate limiter misconfigured: {0}")]
    RateLimit(String),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub queries: Arc<PostQueries>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub accounts: Arc<AccountService>,
    pub tokens: Arc<dyn TokenService>,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    /// Which store backs `repos`, reported by `/health`.
    pub backend: &'static str,
}

impl AppState {
    /// Build the application state: PostgreSQL when `DATABASE_URL` is set,
    /// the in-memory store otherwise.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let (repos, backend) = match &config.database {
            Some(db_config) => (Self::postgres(db_config).await?, "postgres"),
            None => {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
                (InMemoryStore::new().repositories(), "memory")
            }
        };

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let state = Self::new(repos, backend, config.posts_per_page, tokens, passwords);

        #[cfg(feature = "rate-limit")]
        let state = {
            let limiter = InMemoryRateLimiter::new(config.auth_rate_limit.clone())
                .map_err(|e| StartupError::RateLimit(e.to_string()))?;
            Self {
                rate_limiter: Some(Arc::new(limiter)),
                ..state
            }
        };

        tracing::info!(backend, "Application state initialized");
        Ok(state)
    }

    /// Wire services over an existing set of repositories. No rate limiter.
    pub fn new(
        repos: Repositories,
        backend: &'static str,
        posts_per_page: u64,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            queries: Arc::new(PostQueries::new(repos.clone(), posts_per_page)),
            posts: Arc::new(PostService::new(repos.clone())),
            comments: Arc::new(CommentService::new(repos.clone())),
            accounts: Arc::new(AccountService::new(repos.users.clone(), passwords)),
            tokens,
            rate_limiter: None,
            backend,
            repos,
        }
    }

    #[cfg(feature = "postgres")]
    async fn postgres(
        db_config: &blogicum_infra::DatabaseConfig,
    ) -> Result<Repositories, StartupError> {
        let connections = DatabaseConnections::init(db_config)
            .await
            .map_err(|e| StartupError::Database(e.to_string()))?;
        Ok(connections.repositories())
    }

    #[cfg(not(feature = "postgres"))]
    async fn postgres(
        _db_config: &blogicum_infra::DatabaseConfig,
    ) -> Result<Repositories, StartupError> {
        Err(StartupError::PostgresDisabled)
    }
}
