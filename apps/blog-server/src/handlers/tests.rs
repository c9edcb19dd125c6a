//! HTTP scenarios against the in-memory store.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use blogicum_core::domain::{Category, Comment, Post, User};
use blogicum_core::ports::{BaseRepository, RateLimiter};
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::state::AppState;

macro_rules! init_app {
    ($state:expr) => {
        init_app!($state, None)
    };
    ($state:expr, $limiter:expr) => {{
        let state: AppState = $state.clone();
        let limiter: Option<Arc<dyn RateLimiter>> = $limiter;
        test::init_service(
            App::new()
                .app_data(web::Data::new(state.tokens.clone()))
                .app_data(web::Data::new(state))
                .configure(move |cfg| configure_routes(cfg, limiter)),
        )
        .await
    }};
}

fn test_state(per_page: u64) -> AppState {
    AppState::new(
        InMemoryStore::new().repositories(),
        "memory",
        per_page,
        Arc::new(JwtTokenService::new(JwtConfig::default())),
        Arc::new(Argon2PasswordService::new()),
    )
}

async fn seed_user(state: &AppState, username: &str) -> User {
    state
        .repos
        .users
        .insert(User::new(
            username.into(),
            format!("{username}@example.com"),
            "unused".into(),
        ))
        .await
        .unwrap()
}

async fn seed_post(state: &AppState, author: &User, title: &str, offset: Duration) -> Post {
    state
        .repos
        .posts
        .insert(Post::new(
            author.id,
            title.into(),
            "Some text".into(),
            Utc::now() + offset,
        ))
        .await
        .unwrap()
}

fn bearer(state: &AppState, user: &User) -> (header::HeaderName, String) {
    let token = state.tokens.generate_token(user.id, &user.username).unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn titles(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_future_post_only_on_owners_profile() {
    let state = test_state(10);
    let author = seed_user(&state, "anna").await;
    seed_post(&state, &author, "Today", -Duration::hours(1)).await;
    seed_post(&state, &author, "Tomorrow", Duration::days(1)).await;
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/").to_request();
    let index: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&index), vec!["Today"]);

    let req = test::TestRequest::get().uri("/profile/anna").to_request();
    let public: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&public["posts"]), vec!["Today"]);
    assert_eq!(public["is_owner"], false);

    let req = test::TestRequest::get()
        .uri("/profile/anna")
        .insert_header(bearer(&state, &author))
        .to_request();
    let own: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&own["posts"]), vec!["Tomorrow", "Today"]);
    assert_eq!(own["is_owner"], true);
}

#[actix_web::test]
async fn test_stranger_cannot_delete_comment() {
    let state = test_state(10);
    let a = seed_user(&state, "a").await;
    let b = seed_user(&state, "b").await;
    let c = seed_user(&state, "c").await;
    let post = seed_post(&state, &a, "Post", -Duration::hours(1)).await;
    let comment = state
        .repos
        .comments
        .insert(Comment::new(post.id, b.id, "Nice".into()))
        .await
        .unwrap();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}", post.id, comment.id))
        .insert_header(bearer(&state, &c))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}", post.id));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.id))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 1);
    assert_eq!(detail["post"]["comment_count"], 1);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}", post.id, comment.id))
        .insert_header(bearer(&state, &b))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(state.repos.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_unpublished_category_is_not_found() {
    let state = test_state(10);
    let author = seed_user(&state, "anna").await;
    let mut hidden = Category::new("Hidden".into(), String::new(), "hidden".into());
    hidden.is_published = false;
    let hidden = state.repos.categories.insert(hidden).await.unwrap();
    let mut post = seed_post(&state, &author, "Inside", -Duration::hours(1)).await;
    post.category_id = Some(hidden.id);
    state.repos.posts.update(post.clone()).await.unwrap();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/category/hidden").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/").to_request();
    let index: Value = test::call_and_read_body_json(&app, req).await;
    assert!(titles(&index).is_empty());

    // Still reachable by its author.
    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.id))
        .insert_header(bearer(&state, &author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_page_past_the_end_is_not_found() {
    let state = test_state(2);
    let author = seed_user(&state, "anna").await;
    for i in 0..3 {
        seed_post(&state, &author, &format!("P{i}"), -Duration::hours(i + 1)).await;
    }
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/?page=2").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&page), vec!["P2"]);
    assert_eq!(page["has_previous"], true);
    assert_eq!(page["has_next"], false);

    for uri in ["/?page=3", "/?page=0", "/?page=18446744073709551615"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn test_anonymous_create_redirects_to_login() {
    let state = test_state(10);
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/posts/create").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login?next=%2Fposts%2Fcreate");

    let req = test::TestRequest::post()
        .uri("/posts/create")
        .set_json(json!({ "title": "T", "text": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login?next=%2Fposts%2Fcreate");

    let req = test::TestRequest::get().uri("/edit_profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/auth/login?next=%2Fedit_profile");
}

#[actix_web::test]
async fn test_create_and_edit_post() {
    let state = test_state(10);
    let author = seed_user(&state, "anna").await;
    let other = seed_user(&state, "boris").await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/posts/create")
        .insert_header(bearer(&state, &author))
        .set_json(json!({ "title": "", "text": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["text"].is_array());

    let req = test::TestRequest::post()
        .uri("/posts/create")
        .insert_header(bearer(&state, &author))
        .set_json(json!({ "title": "First", "text": "Hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/profile/anna");

    let req = test::TestRequest::get().uri("/").to_request();
    let index: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = index["items"][0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/edit"))
        .insert_header(bearer(&state, &other))
        .set_json(json!({ "title": "Hijacked", "text": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{post_id}"));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}/edit"))
        .insert_header(bearer(&state, &author))
        .to_request();
    let form: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(form["form"]["title"], "First");
    assert!(form["categories"].is_array());

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/edit"))
        .insert_header(bearer(&state, &author))
        .set_json(json!({ "title": "Renamed", "text": "Hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), format!("/posts/{post_id}"));

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/delete"))
        .insert_header(bearer(&state, &author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/");

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_comment_flow() {
    let state = test_state(10);
    let author = seed_user(&state, "anna").await;
    let reader = seed_user(&state, "boris").await;
    let post = seed_post(&state, &author, "Post", -Duration::hours(1)).await;
    let hidden = seed_post(&state, &author, "Later", Duration::days(1)).await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", post.id))
        .insert_header(bearer(&state, &reader))
        .set_json(json!({ "text": "First!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}", post.id));

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", hidden.id))
        .insert_header(bearer(&state, &reader))
        .set_json(json!({ "text": "Sneaky" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.id))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    let comment_id = detail["comments"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(detail["comments"][0]["author"]["username"], "boris");

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit_comment/{comment_id}", post.id))
        .insert_header(bearer(&state, &reader))
        .to_request();
    let form: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(form["form"]["text"], "First!");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit_comment/{comment_id}", post.id))
        .insert_header(bearer(&state, &reader))
        .set_json(json!({ "text": "  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Addressed through a post it does not belong to.
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit_comment/{comment_id}", hidden.id))
        .insert_header(bearer(&state, &reader))
        .set_json(json!({ "text": "Moved" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_register_login_and_cookie_session() {
    let state = test_state(10);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/registration")
        .set_json(json!({
            "username": "new.user",
            "email": "new@example.com",
            "password": "long-enough",
            "password_confirmation": "long-enough",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "new.user", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "new.user", "password": "long-enough" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
        .expect("login sets the session cookie");
    assert_eq!(cookie.http_only(), Some(true));
    let token = cookie.value().to_string();

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, token.clone()))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["username"], "new.user");

    let req = test::TestRequest::post()
        .uri("/edit_profile")
        .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, token))
        .set_json(json!({
            "username": "renamed",
            "first_name": "New",
            "last_name": "User",
            "email": "new@example.com",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/profile/renamed");

    let req = test::TestRequest::post().uri("/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let removal = resp
        .response()
        .cookies()
        .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
        .expect("logout clears the session cookie");
    assert!(removal.value().is_empty());

    let req = test::TestRequest::get().uri("/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_registration_rejects_duplicates() {
    let state = test_state(10);
    seed_user(&state, "anna").await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/registration")
        .set_json(json!({
            "username": "anna",
            "email": "anna2@example.com",
            "password": "long-enough",
            "password_confirmation": "long-enough",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["username"].is_array());
}

#[actix_web::test]
async fn test_health_reports_backend() {
    let state = test_state(10);
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}

#[cfg(feature = "rate-limit")]
#[actix_web::test]
async fn test_auth_scope_is_rate_limited() {
    use blogicum_infra::{InMemoryRateLimiter, RateLimitConfig};

    let state = test_state(10);
    let limiter = InMemoryRateLimiter::new(RateLimitConfig {
        max_requests: 1,
        window: std::time::Duration::from_secs(60),
    })
    .unwrap();
    let app = init_app!(state, Some(Arc::new(limiter) as Arc<dyn RateLimiter>));

    let login = || {
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "nobody", "password": "whatever" }))
            .to_request()
    };

    let resp = test::call_service(&app, login()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, login()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key(header::RETRY_AFTER));

    // Pages outside /auth are not limited.
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
