use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::http::middleware::auth::require_auth;
use crate::http::routes::{analytics, auth, comments, health, posts};
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    let cors = build_cors(&state);
    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/api/posts/{post_id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/api/posts/{post_id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/api/comments/{comment_id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/api/comments-daily-breakdown",
            get(analytics::comments_daily_breakdown),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);
    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    router
}

fn build_cors(state: &AppState) -> Option<CorsLayer> {
    let configured = &state.config.cors_allow_origins;
    if configured.is_empty() {
        return None;
    }
    let cors = CorsLayer::new().allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]);
    if configured.iter().any(|origin| origin.trim() == "*") {
        return Some(cors.allow_origin(Any).allow_headers(Any));
    }
    let mut origins = Vec::new();
    for origin in configured {
        match HeaderValue::from_str(origin.trim()) {
            Ok(value) => origins.push(value),
            Err(_) => tracing::warn!(origin = %origin, "invalid CORS origin ignored"),
        }
    }
    if origins.is_empty() {
        return None;
    }
    Some(
        cors.allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
            .allow_headers([CONTENT_TYPE, AUTHORIZATION]),
    )
}
