//! Error handling - RFC 7807 bodies, and the redirects that stand in for
//! "forbidden" on author-only pages.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use uuid::Uuid;

use blogicum_core::error::{DomainError, RepoError};
use blogicum_shared::{ErrorResponse, RedirectResponse};

pub const NOT_AUTHOR_MESSAGE: &str = "Only the author can change this.";

/// Application-level error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Anonymous caller on a page that needs an account.
    #[error("Login required for {next}")]
    LoginRequired { next: String },

    /// Signed in, but not the author of the post (or of a comment under it).
    #[error("Not the author of content under post {post_id}")]
    NotAuthor { post_id: Uuid },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed")]
    Validation(BTreeMap<String, Vec<String>>),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Point a login redirect back at `next`. Other errors pass through.
    pub fn with_next(self, next: &str) -> Self {
        match self {
            AppError::LoginRequired { .. } => AppError::LoginRequired {
                next: next.to_string(),
            },
            other => other,
        }
    }

    /// Where a redirecting error sends the client.
    pub fn location(&self) -> Option<String> {
        match self {
            AppError::LoginRequired { next } => Some(
                serde_urlencoded::to_string(&[("next", next.as_str())])
                    .map_or_else(|_| "/auth/login".to_string(), |q| format!("/auth/login?{q}")),
            ),
            AppError::NotAuthor { post_id } => Some(format!("/posts/{post_id}")),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::LoginRequired { .. } | AppError::NotAuthor { .. } => StatusCode::SEE_OTHER,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Some(location) = self.location() {
            let message = match self {
                AppError::NotAuthor { .. } => NOT_AUTHOR_MESSAGE,
                _ => "Please log in to continue.",
            };
            return HttpResponse::build(self.status_code())
                .insert_header((header::LOCATION, location.clone()))
                .json(RedirectResponse::to(location).with_message(message));
        }

        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized().with_detail(detail),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::Validation(errors) => ErrorResponse::validation(errors.clone()),
            AppError::Internal(detail) => {
                // Log internal errors
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
            AppError::LoginRequired { .. } | AppError::NotAuthor { .. } => {
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{entity_type} {key} not found"))
            }
            DomainError::Validation(errors) => AppError::Validation(errors.into_map()),
            DomainError::LoginRequired => AppError::LoginRequired {
                next: "/".to_string(),
            },
            DomainError::InvalidCredentials => {
                AppError::Unauthorized("Invalid username or password".to_string())
            }
            DomainError::NotAuthor { post_id } => AppError::NotAuthor { post_id },
            DomainError::Internal(msg) => AppError::Internal(msg),
            DomainError::Repo(err) => err.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
