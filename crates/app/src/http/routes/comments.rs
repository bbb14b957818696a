use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::http::middleware::auth::AuthUser;
use crate::http::routes::error_response;
use crate::services::comments::{self, CommentServiceError};
use crate::state::AppState;
use quill_core::domain::comments::{Comment, CommentPage};
use quill_core::types::pagination::Pagination;
use quill_infra::db::{count_published_comments, CommentRecord};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), CommentsApiError> {
    let record = comments::create_comment(&state, user.id, post_id, &request.body).await?;
    Ok((StatusCode::CREATED, Json(to_comment(record))))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<CommentPage>, CommentsApiError> {
    let page = Pagination::new(params.limit, params.offset);
    let records = comments::list_comments(&state, post_id, page).await?;
    let total = count_published_comments(&state.db, post_id)
        .await
        .map_err(CommentServiceError::Comments)?;
    Ok(Json(CommentPage {
        post_id,
        total: total as usize,
        comments: records.into_iter().map(to_comment).collect(),
    }))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<Comment>, CommentsApiError> {
    let record = comments::get_comment(&state, user.id, user.role, comment_id).await?;
    Ok(Json(to_comment(record)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(comment_id): Path<Uuid>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, CommentsApiError> {
    let record = comments::update_comment(&state, user.id, comment_id, &request.body).await?;
    Ok(Json(to_comment(record)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(comment_id): Path<Uuid>,
) -> Result<StatusCode, CommentsApiError> {
    comments::delete_comment(&state, user.id, user.role, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn to_comment(record: CommentRecord) -> Comment {
    Comment {
        id: record.id,
        post_id: record.post_id,
        author_id: record.author_id,
        body: record.body,
        flagged: record.flagged,
        system: record.system,
        created_at: record.created_at,
    }
}

#[derive(Debug)]
pub struct CommentsApiError(CommentServiceError);

impl From<CommentServiceError> for CommentsApiError {
    fn from(err: CommentServiceError) -> Self {
        CommentsApiError(err)
    }
}

impl IntoResponse for CommentsApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            CommentServiceError::EmptyBody | CommentServiceError::BodyTooLong => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            CommentServiceError::PostNotFound | CommentServiceError::CommentNotFound => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            CommentServiceError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            CommentServiceError::ModerationRejected { .. } => {
                (StatusCode::BAD_REQUEST, "moderation_rejected")
            }
            CommentServiceError::Moderation(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            CommentServiceError::Comments(_)
            | CommentServiceError::Posts(_)
            | CommentServiceError::Replies(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        error_response(status, code, self.0.to_string())
    }
}
