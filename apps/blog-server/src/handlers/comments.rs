//! Comment submission and author-only comment edits.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blogicum_shared::dto::{CommentForm, CommentFormView};

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views;

use super::see_other;

/// POST /posts/{id}/comment
pub async fn create(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<Uuid>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    state
        .comments
        .create(identity.actor(), post_id, body.into_inner().text, Utc::now())
        .await
        .map_err(|e| identity.reject(e))?;

    Ok(see_other(format!("/posts/{post_id}")))
}

/// GET /posts/{id}/edit_comment/{comment_id}
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = state
        .comments
        .edit_form(identity.actor(), post_id, comment_id)
        .await
        .map_err(|e| identity.reject(e))?;

    Ok(HttpResponse::Ok().json(CommentFormView {
        post_id,
        comment_id,
        form: views::comment_form(comment),
    }))
}

/// POST /posts/{id}/edit_comment/{comment_id}
pub async fn edit(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .comments
        .update(identity.actor(), post_id, comment_id, body.into_inner().text)
        .await
        .map_err(|e| identity.reject(e))?;

    Ok(see_other(format!("/posts/{post_id}")))
}

/// POST /posts/{id}/delete_comment/{comment_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .comments
        .delete(identity.actor(), post_id, comment_id)
        .await
        .map_err(|e| identity.reject(e))?;

    Ok(see_other(format!("/posts/{post_id}")))
}
