use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::http::middleware::auth::AuthUser;
use crate::http::routes::error_response;
use crate::state::AppState;
use quill_core::domain::moderation::Verdict;
use quill_core::domain::posts::{
    Post, DEFAULT_REPLY_DELAY_SECS, MAX_CONTENT_LEN, MAX_REPLY_DELAY_SECS, MAX_TITLE_LEN,
    MIN_REPLY_DELAY_SECS,
};
use quill_core::types::pagination::Pagination;
use quill_infra::db::{
    delete_post as delete_post_row, find_post_by_id, insert_post, list_posts as list_post_rows,
    update_post as update_post_row, NewPost, PostRecord, PostUpdate, PostsRepoError,
};
use quill_infra::moderation::ModerationError;

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub auto_reply: bool,
    pub auto_reply_delay_secs: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Error)]
pub enum PostsApiError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("post not found")]
    NotFound,
    #[error("not allowed to modify this post")]
    Forbidden,
    #[error("post rejected by moderation ({category})")]
    ModerationRejected { category: String },
    #[error(transparent)]
    Moderation(#[from] ModerationError),
    #[error("db error: {0}")]
    Db(#[from] PostsRepoError),
}

/// Validated creation/update payload. Delay falls back to the default when
/// auto-reply is enabled without one.
#[derive(Debug, PartialEq, Eq)]
struct ValidatedPost<'a> {
    title: &'a str,
    content: &'a str,
    auto_reply: bool,
    auto_reply_delay_secs: i64,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Post>>, PostsApiError> {
    let page = Pagination::new(params.limit, params.offset);
    let records = list_post_rows(&state.db, page.limit(), page.offset()).await?;
    Ok(Json(records.into_iter().map(to_post).collect()))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Post>, PostsApiError> {
    let record = find_post_by_id(&state.db, post_id)
        .await?
        .ok_or(PostsApiError::NotFound)?;
    Ok(Json(to_post(record)))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<PostRequest>,
) -> Result<(StatusCode, Json<Post>), PostsApiError> {
    let validated = validate_post(&request)?;
    moderate_post(&state, validated.title, validated.content).await?;
    let record = insert_post(
        &state.db,
        &NewPost {
            author_id: user.id,
            title: validated.title,
            content: validated.content,
            auto_reply: validated.auto_reply,
            auto_reply_delay_secs: validated.auto_reply_delay_secs,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(to_post(record))))
}

pub async fn update_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
    Json(request): Json<PostRequest>,
) -> Result<Json<Post>, PostsApiError> {
    let existing = find_post_by_id(&state.db, post_id)
        .await?
        .ok_or(PostsApiError::NotFound)?;
    if existing.author_id != user.id && !user.role.is_admin() {
        return Err(PostsApiError::Forbidden);
    }
    let validated = validate_post(&request)?;
    moderate_post(&state, validated.title, validated.content).await?;
    let record = update_post_row(
        &state.db,
        post_id,
        &PostUpdate {
            title: validated.title,
            content: validated.content,
            auto_reply: validated.auto_reply,
            auto_reply_delay_secs: validated.auto_reply_delay_secs,
        },
    )
    .await?
    .ok_or(PostsApiError::NotFound)?;
    Ok(Json(to_post(record)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> Result<StatusCode, PostsApiError> {
    let existing = find_post_by_id(&state.db, post_id)
        .await?
        .ok_or(PostsApiError::NotFound)?;
    if existing.author_id != user.id && !user.role.is_admin() {
        return Err(PostsApiError::Forbidden);
    }
    delete_post_row(&state.db, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flagged posts are rejected outright and never stored, unlike comments
/// which are stored hidden.
async fn moderate_post(
    state: &AppState,
    title: &str,
    content: &str,
) -> Result<(), PostsApiError> {
    for text in [title, content] {
        if let Verdict::Flagged { category, .. } = state.moderator.classify(text).await? {
            return Err(PostsApiError::ModerationRejected { category });
        }
    }
    Ok(())
}

fn validate_post(request: &PostRequest) -> Result<ValidatedPost<'_>, PostsApiError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(PostsApiError::Validation("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(PostsApiError::Validation("title is too long"));
    }
    let content = request.content.trim();
    if content.is_empty() {
        return Err(PostsApiError::Validation("content must not be empty"));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(PostsApiError::Validation("content is too long"));
    }
    let auto_reply_delay_secs = request
        .auto_reply_delay_secs
        .unwrap_or(DEFAULT_REPLY_DELAY_SECS);
    if request.auto_reply
        && !(MIN_REPLY_DELAY_SECS..=MAX_REPLY_DELAY_SECS).contains(&auto_reply_delay_secs)
    {
        return Err(PostsApiError::Validation(
            "auto-reply delay must be between 1 second and 7 days",
        ));
    }
    Ok(ValidatedPost {
        title,
        content,
        auto_reply: request.auto_reply,
        auto_reply_delay_secs,
    })
}

fn to_post(record: PostRecord) -> Post {
    Post {
        id: record.id,
        author_id: record.author_id,
        title: record.title,
        content: record.content,
        auto_reply: record.auto_reply,
        auto_reply_delay_secs: record.auto_reply_delay_secs,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

impl IntoResponse for PostsApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            PostsApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            PostsApiError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            PostsApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            PostsApiError::ModerationRejected { .. } => {
                (StatusCode::BAD_REQUEST, "moderation_rejected")
            }
            PostsApiError::Moderation(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            PostsApiError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        error_response(status, code, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, content: &str) -> PostRequest {
        PostRequest {
            title: title.to_string(),
            content: content.to_string(),
            auto_reply: false,
            auto_reply_delay_secs: None,
        }
    }

    #[test]
    fn trims_and_accepts_valid_post() {
        let req = request("  Hello  ", "  world  ");
        let validated = validate_post(&req).unwrap();
        assert_eq!(validated.title, "Hello");
        assert_eq!(validated.content, "world");
        assert_eq!(validated.auto_reply_delay_secs, DEFAULT_REPLY_DELAY_SECS);
    }

    #[test]
    fn rejects_empty_and_oversized_fields() {
        assert!(validate_post(&request("", "body")).is_err());
        assert!(validate_post(&request("title", "  ")).is_err());
        assert!(validate_post(&request(&"t".repeat(MAX_TITLE_LEN + 1), "body")).is_err());
        assert!(validate_post(&request("title", &"c".repeat(MAX_CONTENT_LEN + 1))).is_err());
    }

    #[test]
    fn auto_reply_delay_is_bounded_when_enabled() {
        let mut req = request("title", "body");
        req.auto_reply = true;
        req.auto_reply_delay_secs = Some(0);
        assert!(validate_post(&req).is_err());
        req.auto_reply_delay_secs = Some(MAX_REPLY_DELAY_SECS + 1);
        assert!(validate_post(&req).is_err());
        req.auto_reply_delay_secs = Some(300);
        assert!(validate_post(&req).is_ok());
    }

    #[test]
    fn delay_is_not_checked_when_auto_reply_disabled() {
        let mut req = request("title", "body");
        req.auto_reply_delay_secs = Some(-5);
        assert!(validate_post(&req).is_ok());
    }
}
