//! Author profiles.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_shared::dto::{PageQuery, ProfileForm};

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views;

use super::see_other;

/// GET /profile/{username}
pub async fn profile(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let listing = state
        .queries
        .profile_listing(&username, identity.actor(), Utc::now(), query.number())
        .await?;

    Ok(HttpResponse::Ok().json(views::profile_page(listing)))
}

/// GET /edit_profile
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let user = state
        .accounts
        .current_user(identity.actor())
        .await
        .map_err(|e| identity.reject(e))?;

    Ok(HttpResponse::Ok().json(views::profile_form(user)))
}

/// POST /edit_profile
pub async fn edit(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<ProfileForm>,
) -> AppResult<HttpResponse> {
    let user = state
        .accounts
        .update_profile(identity.actor(), views::profile_changes(body.into_inner()))
        .await
        .map_err(|e| identity.reject(e))?;

    Ok(see_other(format!("/profile/{}", user.username)))
}
