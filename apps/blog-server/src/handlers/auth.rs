//! Authentication handlers.

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::{HttpResponse, web};

use blogicum_core::services::Registration;
use blogicum_shared::dto::{AuthResponse, LoginRequest, RegisterRequest};

use crate::middleware::auth::{ACCESS_TOKEN_COOKIE, Identity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views;

/// POST /auth/registration
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .accounts
        .register(Registration {
            username: req.username,
            email: req.email,
            password: req.password,
            password_confirmation: req.password_confirmation,
        })
        .await?;

    Ok(HttpResponse::Created().json(views::user(user)))
}

/// POST /auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .accounts
        .authenticate(&req.username, &req.password)
        .await?;

    // Generate token
    let token = state
        .tokens
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let expires_in = state.tokens.expiration_seconds();

    let cookie = Cookie::build(ACCESS_TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(expires_in))
        .finish();

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: expires_in.max(0) as u64,
    }))
}

/// POST /auth/logout - drops the session cookie. Bearer tokens simply expire.
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(ACCESS_TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::NoContent().cookie(cookie).finish()
}

/// GET /auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state.accounts.current_user(Some(identity.user_id)).await?;
    Ok(HttpResponse::Ok().json(views::user(user)))
}
