//! Public listings: the index and category pages.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_shared::dto::PageQuery;

use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views;

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .queries
        .global_listing(Utc::now(), query.number())
        .await?;

    Ok(HttpResponse::Ok().json(views::page(page, views::post)))
}

/// GET /category/{slug}
pub async fn category(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let listing = state
        .queries
        .category_listing(&slug, Utc::now(), query.number())
        .await?;

    Ok(HttpResponse::Ok().json(views::category_page(listing)))
}
