//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod listings;
mod posts;
mod profile;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use actix_web::{HttpResponse, http::header, web};

use blogicum_core::ports::RateLimiter;
use blogicum_shared::RedirectResponse;

use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes. `limiter` guards the `/auth` scope.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Option<Arc<dyn RateLimiter>>) {
    cfg.route("/", web::get().to(listings::index))
        .route("/health", web::get().to(health::health_check))
        .route("/category/{slug}", web::get().to(listings::category))
        .route("/profile/{username}", web::get().to(profile::profile))
        .service(
            web::resource("/edit_profile")
                .route(web::get().to(profile::edit_form))
                .route(web::post().to(profile::edit)),
        )
        .service(
            web::scope("/posts")
                // Registered before "/{id}" so "create" is not taken for an id.
                .service(
                    web::resource("/create")
                        .route(web::get().to(posts::create_form))
                        .route(web::post().to(posts::create)),
                )
                .route("/{id}", web::get().to(posts::detail))
                .service(
                    web::resource("/{id}/edit")
                        .route(web::get().to(posts::edit_form))
                        .route(web::post().to(posts::edit)),
                )
                .route("/{id}/delete", web::post().to(posts::delete))
                .route("/{id}/comment", web::post().to(comments::create))
                .service(
                    web::resource("/{id}/edit_comment/{comment_id}")
                        .route(web::get().to(comments::edit_form))
                        .route(web::post().to(comments::edit)),
                )
                .route(
                    "/{id}/delete_comment/{comment_id}",
                    web::post().to(comments::delete),
                ),
        )
        .service(
            web::scope("/auth")
                .wrap(RateLimitMiddleware::new(limiter))
                .route("/registration", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .route("/logout", web::post().to(auth::logout))
                .route("/me", web::get().to(auth::me)),
        );
}

/// `303 See Other` after a successful form submission.
fn see_other(location: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.clone()))
        .json(RedirectResponse::to(location))
}
