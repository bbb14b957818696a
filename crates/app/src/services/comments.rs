use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;
use quill_core::domain::comments::MAX_BODY_LEN;
use quill_core::domain::moderation::Verdict;
use quill_core::domain::users::Role;
use quill_core::types::pagination::Pagination;
use quill_infra::db::{
    cancel_pending_for_comment, delete_comment as delete_comment_row, enqueue_reply,
    find_comment_by_id, find_post_by_id, insert_comment, list_published_comments,
    update_comment_body, CommentRecord, CommentsRepoError, NewComment, PostRecord,
    PostsRepoError, RepliesRepoError,
};
use quill_infra::moderation::ModerationError;

#[derive(Debug, Error)]
pub enum CommentServiceError {
    #[error("comment body must not be empty")]
    EmptyBody,
    #[error("comment body exceeds {MAX_BODY_LEN} characters")]
    BodyTooLong,
    #[error("post not found")]
    PostNotFound,
    #[error("comment not found")]
    CommentNotFound,
    #[error("not allowed to delete this comment")]
    Forbidden,
    #[error("comment rejected by moderation ({category})")]
    ModerationRejected { category: String },
    #[error(transparent)]
    Moderation(#[from] ModerationError),
    #[error("comments db error: {0}")]
    Comments(#[from] CommentsRepoError),
    #[error("posts db error: {0}")]
    Posts(#[from] PostsRepoError),
    #[error("replies db error: {0}")]
    Replies(#[from] RepliesRepoError),
}

/// Creates a user comment behind the moderation gate.
///
/// Flagged content is stored with `flagged = true` (hidden from listings and
/// analytics) and surfaces as `ModerationRejected`. A moderation outage
/// aborts before anything is written. The auto-reply task is enqueued only
/// after the comment insert has committed, so a failed write never leaves a
/// dangling task.
pub async fn create_comment(
    state: &AppState,
    author_id: Uuid,
    post_id: Uuid,
    body: &str,
) -> Result<CommentRecord, CommentServiceError> {
    let body = validate_body(body)?;
    let post = find_post_by_id(&state.db, post_id)
        .await?
        .ok_or(CommentServiceError::PostNotFound)?;

    let verdict = state.moderator.classify(body).await?;

    let record = insert_comment(
        &state.db,
        &NewComment {
            post_id,
            author_id,
            body,
            flagged: verdict.is_flagged(),
            system: false,
        },
    )
    .await?;

    if let Verdict::Flagged { category, confidence } = verdict {
        warn!(comment_id = %record.id, %category, confidence, "comment flagged by moderation");
        return Err(CommentServiceError::ModerationRejected { category });
    }

    if post.auto_reply {
        let fire_at = Utc::now() + Duration::seconds(post.auto_reply_delay_secs);
        let task = enqueue_reply(&state.db, record.id, post.id, fire_at).await?;
        info!(comment_id = %record.id, task_id = %task.id, %fire_at, "auto-reply scheduled");
    }

    Ok(record)
}

/// Edits a comment's body behind the same moderation gate as creation.
/// Only the author may edit, and the flag is re-evaluated against the new
/// body: an edit that flags hides the comment and fails the request.
pub async fn update_comment(
    state: &AppState,
    actor_id: Uuid,
    comment_id: Uuid,
    body: &str,
) -> Result<CommentRecord, CommentServiceError> {
    let body = validate_body(body)?;
    let comment = find_comment_by_id(&state.db, comment_id)
        .await?
        .ok_or(CommentServiceError::CommentNotFound)?;
    if !can_update(actor_id, &comment) {
        return Err(CommentServiceError::Forbidden);
    }

    let verdict = state.moderator.classify(body).await?;

    let record = update_comment_body(&state.db, comment_id, body, verdict.is_flagged())
        .await?
        .ok_or(CommentServiceError::CommentNotFound)?;

    if let Verdict::Flagged { category, confidence } = verdict {
        warn!(comment_id = %record.id, %category, confidence, "edited comment flagged by moderation");
        return Err(CommentServiceError::ModerationRejected { category });
    }

    Ok(record)
}

/// Deletes a comment and cancels any reply still scheduled for it.
pub async fn delete_comment(
    state: &AppState,
    actor_id: Uuid,
    actor_role: Role,
    comment_id: Uuid,
) -> Result<(), CommentServiceError> {
    let comment = find_comment_by_id(&state.db, comment_id)
        .await?
        .ok_or(CommentServiceError::CommentNotFound)?;
    let post = find_post_by_id(&state.db, comment.post_id).await?;
    if !can_delete(actor_id, actor_role, &comment, post.as_ref()) {
        return Err(CommentServiceError::Forbidden);
    }
    let cancelled = cancel_pending_for_comment(&state.db, comment_id).await?;
    if cancelled > 0 {
        info!(%comment_id, cancelled, "pending auto-replies cancelled");
    }
    delete_comment_row(&state.db, comment_id).await?;
    Ok(())
}

pub async fn get_comment(
    state: &AppState,
    actor_id: Uuid,
    actor_role: Role,
    comment_id: Uuid,
) -> Result<CommentRecord, CommentServiceError> {
    let comment = find_comment_by_id(&state.db, comment_id)
        .await?
        .ok_or(CommentServiceError::CommentNotFound)?;
    if comment.flagged && comment.author_id != actor_id && !actor_role.is_admin() {
        // Hidden comments look absent to everyone but their author and admins.
        return Err(CommentServiceError::CommentNotFound);
    }
    Ok(comment)
}

pub async fn list_comments(
    state: &AppState,
    post_id: Uuid,
    page: Pagination,
) -> Result<Vec<CommentRecord>, CommentServiceError> {
    find_post_by_id(&state.db, post_id)
        .await?
        .ok_or(CommentServiceError::PostNotFound)?;
    let comments =
        list_published_comments(&state.db, post_id, page.limit(), page.offset()).await?;
    Ok(comments)
}

pub fn validate_body(body: &str) -> Result<&str, CommentServiceError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(CommentServiceError::EmptyBody);
    }
    if trimmed.chars().count() > MAX_BODY_LEN {
        return Err(CommentServiceError::BodyTooLong);
    }
    Ok(trimmed)
}

// Editing is tighter than deletion: only the author may rewrite their own
// words, and automatic replies are not editable at all.
fn can_update(actor_id: Uuid, comment: &CommentRecord) -> bool {
    !comment.system && comment.author_id == actor_id
}

fn can_delete(
    actor_id: Uuid,
    actor_role: Role,
    comment: &CommentRecord,
    post: Option<&PostRecord>,
) -> bool {
    if actor_role.is_admin() || comment.author_id == actor_id {
        return true;
    }
    post.is_some_and(|post| post.author_id == actor_id)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn comment(author_id: Uuid, post_id: Uuid) -> CommentRecord {
        CommentRecord {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            body: "hello".to_string(),
            flagged: false,
            system: false,
            created_at: Utc::now(),
        }
    }

    fn post(author_id: Uuid) -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            author_id,
            title: "t".to_string(),
            content: "c".to_string(),
            auto_reply: false,
            auto_reply_delay_secs: 300,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn validate_body_trims_and_bounds() {
        assert_eq!(validate_body("  hi  ").unwrap(), "hi");
        assert!(matches!(validate_body("   "), Err(CommentServiceError::EmptyBody)));
        let long = "x".repeat(MAX_BODY_LEN + 1);
        assert!(matches!(validate_body(&long), Err(CommentServiceError::BodyTooLong)));
        let max = "x".repeat(MAX_BODY_LEN);
        assert!(validate_body(&max).is_ok());
    }

    #[test]
    fn author_can_delete_own_comment() {
        let author = Uuid::new_v4();
        let c = comment(author, Uuid::new_v4());
        assert!(can_delete(author, Role::User, &c, None));
    }

    #[test]
    fn post_owner_can_delete_comments_on_their_post() {
        let owner = Uuid::new_v4();
        let p = post(owner);
        let c = comment(Uuid::new_v4(), p.id);
        assert!(can_delete(owner, Role::User, &c, Some(&p)));
    }

    #[test]
    fn admin_can_delete_any_comment() {
        let c = comment(Uuid::new_v4(), Uuid::new_v4());
        assert!(can_delete(Uuid::new_v4(), Role::Admin, &c, None));
    }

    #[test]
    fn only_the_author_can_update() {
        let author = Uuid::new_v4();
        let c = comment(author, Uuid::new_v4());
        assert!(can_update(author, &c));
        assert!(!can_update(Uuid::new_v4(), &c));
    }

    #[test]
    fn system_replies_are_not_editable() {
        let mut c = comment(quill_core::domain::users::SYSTEM_USER_ID, Uuid::new_v4());
        c.system = true;
        assert!(!can_update(quill_core::domain::users::SYSTEM_USER_ID, &c));
    }

    #[test]
    fn stranger_cannot_delete() {
        let p = post(Uuid::new_v4());
        let c = comment(Uuid::new_v4(), p.id);
        assert!(!can_delete(Uuid::new_v4(), Role::User, &c, Some(&p)));
    }
}
