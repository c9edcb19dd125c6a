//! Post pages: detail, create, edit, delete.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blogicum_core::DomainError;
use blogicum_shared::dto::{PostForm, PostFormView};

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views;

use super::see_other;

/// The form plus every category and location the author may pick.
async fn form_view(state: &AppState, form: PostForm) -> AppResult<PostFormView> {
    let categories = state.repos.categories.list().await?;
    let locations = state.repos.locations.list().await?;

    Ok(PostFormView {
        form,
        categories: categories.into_iter().map(views::category).collect(),
        locations: locations.into_iter().map(views::location).collect(),
    })
}

/// GET /posts/{id}
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state
        .queries
        .post_detail(post_id.into_inner(), identity.actor(), Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(views::post_detail(detail)))
}

/// GET /posts/create - an empty form, publication date preset to now.
pub async fn create_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    if identity.actor().is_none() {
        return Err(identity.reject(DomainError::LoginRequired));
    }

    let form = PostForm {
        pub_date: Some(Utc::now()),
        ..PostForm::default()
    };

    Ok(HttpResponse::Ok().json(form_view(&state, form).await?))
}

/// POST /posts/create
pub async fn create(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let draft = views::post_draft(body.into_inner());
    let post = state
        .posts
        .create(identity.actor(), draft, Utc::now())
        .await
        .map_err(|e| identity.reject(e))?;

    // The token may predate a rename, so read the username back.
    let author = state
        .accounts
        .current_user(Some(post.author_id))
        .await
        .map_err(|e| identity.reject(e))?;

    Ok(see_other(format!("/profile/{}", author.username)))
}

/// GET /posts/{id}/edit
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .edit_form(identity.actor(), post_id.into_inner())
        .await
        .map_err(|e| identity.reject(e))?;

    Ok(HttpResponse::Ok().json(form_view(&state, views::post_form(post)).await?))
}

/// POST /posts/{id}/edit
pub async fn edit(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<Uuid>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .update(
            identity.actor(),
            post_id.into_inner(),
            views::post_draft(body.into_inner()),
        )
        .await
        .map_err(|e| identity.reject(e))?;

    Ok(see_other(format!("/posts/{}", post.id)))
}

/// POST /posts/{id}/delete
pub async fn delete(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(identity.actor(), post_id.into_inner())
        .await
        .map_err(|e| identity.reject(e))?;

    Ok(see_other("/".to_string()))
}
