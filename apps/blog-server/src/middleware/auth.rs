//! Authentication extractors.
//!
//! A token is read from `Authorization: Bearer <token>` first, then from the
//! `access_token` cookie set at login.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use std::sync::Arc;

use uuid::Uuid;

use blogicum_core::DomainError;
use blogicum_core::ports::{AuthError, TokenClaims, TokenService};

use super::error::AppError;

/// Cookie carrying the access token for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AuthenticationError(pub AuthError);

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::MissingAuth
            | AuthError::InvalidCredentials => actix_web::http::StatusCode::UNAUTHORIZED,
            AuthError::HashingError(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use blogicum_shared::ErrorResponse;

        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Provide a Bearer token or log in to receive a session cookie."),
            AuthError::InvalidCredentials => ErrorResponse::unauthorized(),
            AuthError::HashingError(_) => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

/// Raw token from the request, if any.
fn request_token(req: &HttpRequest) -> Result<Option<String>, AuthError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let auth_str = value
            .to_str()
            .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

        // Parse "Bearer <token>"
        return auth_str
            .strip_prefix("Bearer ")
            .map(|t| Some(t.to_string()))
            .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()));
    }

    Ok(req
        .cookie(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty()))
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    // Get token service from app data
    let token_service = req
        .app_data::<web::Data<Arc<dyn TokenService>>>()
        .ok_or_else(|| {
            tracing::error!("TokenService not found in app data");
            AuthError::InvalidToken("Server configuration error".to_string())
        })?;

    let token = request_token(req)?.ok_or(AuthError::MissingAuth)?;
    token_service.validate_token(&token).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(AuthenticationError))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
///
/// Also remembers the requested path, so a service's `LoginRequired` can be
/// turned into a redirect that comes back here after login.
#[derive(Debug, Clone)]
pub struct OptionalIdentity {
    pub identity: Option<Identity>,
    next: String,
}

impl OptionalIdentity {
    /// The acting user's id, `None` for anonymous requests.
    pub fn actor(&self) -> Option<Uuid> {
        self.identity.as_ref().map(|identity| identity.user_id)
    }

    /// Convert a service error, pointing login redirects at this request.
    pub fn reject(&self, err: DomainError) -> AppError {
        AppError::from(err).with_next(&self.next)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = match authenticate(req) {
            Ok(identity) => Some(identity),
            Err(AuthError::MissingAuth) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable credentials");
                None
            }
        };
        let next = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.path().to_string());

        ready(Ok(OptionalIdentity { identity, next }))
    }
}
