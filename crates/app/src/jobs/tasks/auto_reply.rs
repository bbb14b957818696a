use chrono::Utc;
use tracing::{info, warn};

use crate::jobs::JobError;
use crate::state::AppState;
use quill_core::domain::users::SYSTEM_USER_ID;
use quill_infra::db::{
    claim_due_replies, find_comment_by_id, find_post_by_id, insert_comment,
    mark_reply_cancelled, NewComment, ScheduledReplyRecord,
};

const CLAIM_BATCH: i64 = 50;

#[derive(Debug, Default)]
pub struct AutoReplyStats {
    pub claimed: usize,
    pub fired: usize,
    pub cancelled: usize,
}

#[derive(Debug)]
enum FireOutcome {
    Replied,
    Skipped(&'static str),
}

/// One worker pass: claim due tasks (atomically marking them fired, so a
/// crashed-and-retried executor never replies twice) and produce the
/// replies. Any task that cannot produce its reply is downgraded to
/// cancelled rather than retried.
pub async fn run(state: &AppState) -> Result<AutoReplyStats, JobError> {
    let claimed = claim_due_replies(&state.db, Utc::now(), CLAIM_BATCH).await?;
    let mut stats = AutoReplyStats {
        claimed: claimed.len(),
        ..AutoReplyStats::default()
    };

    for task in claimed {
        match fire(state, &task).await {
            Ok(FireOutcome::Replied) => stats.fired += 1,
            Ok(FireOutcome::Skipped(reason)) => {
                info!(task_id = %task.id, reason, "auto-reply skipped");
                mark_reply_cancelled(&state.db, task.id).await?;
                stats.cancelled += 1;
            }
            Err(err) => {
                warn!(task_id = %task.id, error = %err, "auto-reply failed");
                mark_reply_cancelled(&state.db, task.id).await?;
                stats.cancelled += 1;
            }
        }
    }
    Ok(stats)
}

async fn fire(state: &AppState, task: &ScheduledReplyRecord) -> Result<FireOutcome, FireError> {
    let Some(comment) = find_comment_by_id(&state.db, task.comment_id).await? else {
        return Ok(FireOutcome::Skipped("original comment deleted"));
    };
    let Some(_post) = find_post_by_id(&state.db, task.post_id).await? else {
        return Ok(FireOutcome::Skipped("post deleted"));
    };

    // Auto-replies pass through the same moderation gate as user comments.
    let body = state.config.auto_reply_body.as_str();
    let verdict = state.moderator.classify(body).await?;

    let reply = insert_comment(
        &state.db,
        &NewComment {
            post_id: task.post_id,
            author_id: SYSTEM_USER_ID,
            body,
            flagged: verdict.is_flagged(),
            system: true,
        },
    )
    .await?;
    info!(task_id = %task.id, reply_id = %reply.id, parent = %comment.id, "auto-reply posted");
    Ok(FireOutcome::Replied)
}

#[derive(Debug, thiserror::Error)]
enum FireError {
    #[error("moderation error: {0}")]
    Moderation(#[from] quill_infra::moderation::ModerationError),
    #[error("comments db error: {0}")]
    Comments(#[from] quill_infra::db::CommentsRepoError),
    #[error("posts db error: {0}")]
    Posts(#[from] quill_infra::db::PostsRepoError),
}
