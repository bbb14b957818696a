use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepliesRepoError {
    #[error("unknown reply status: {0}")]
    UnknownStatus(String),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Task lifecycle: pending -> fired or pending -> cancelled. A claimed task
/// that fails while firing is downgraded fired -> cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Pending,
    Fired,
    Cancelled,
}

impl ReplyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyStatus::Pending => "pending",
            ReplyStatus::Fired => "fired",
            ReplyStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<ReplyStatus, RepliesRepoError> {
        match value {
            "pending" => Ok(ReplyStatus::Pending),
            "fired" => Ok(ReplyStatus::Fired),
            "cancelled" => Ok(ReplyStatus::Cancelled),
            other => Err(RepliesRepoError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScheduledReplyRecord {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub fire_at: DateTime<Utc>,
    pub status: ReplyStatus,
}

pub async fn enqueue_reply(
    pool: &PgPool,
    comment_id: Uuid,
    post_id: Uuid,
    fire_at: DateTime<Utc>,
) -> Result<ScheduledReplyRecord, RepliesRepoError> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO scheduled_replies (id, comment_id, post_id, fire_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(comment_id)
    .bind(post_id)
    .bind(fire_at)
    .execute(pool)
    .await?;
    Ok(ScheduledReplyRecord {
        id,
        comment_id,
        post_id,
        fire_at,
        status: ReplyStatus::Pending,
    })
}

/// Atomically claims due pending tasks, transitioning them to `fired`.
/// Concurrent or retried executors cannot claim the same task twice: the
/// inner select only sees `pending` rows and skips locked ones.
pub async fn claim_due_replies(
    pool: &PgPool,
    now: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<ScheduledReplyRecord>, RepliesRepoError> {
    let rows = sqlx::query(
        r#"
        UPDATE scheduled_replies
        SET status = 'fired', fired_at = $1
        WHERE id IN (
            SELECT id
            FROM scheduled_replies
            WHERE status = 'pending' AND fire_at <= $1
            ORDER BY fire_at
            LIMIT $2
            FOR UPDATE SKIP LOCKED
        )
        RETURNING id, comment_id, post_id, fire_at, status
        "#,
    )
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(map_reply).collect()
}

pub async fn mark_reply_cancelled(pool: &PgPool, id: Uuid) -> Result<(), RepliesRepoError> {
    sqlx::query(
        r#"
        UPDATE scheduled_replies
        SET status = 'cancelled'
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Cancels any not-yet-fired reply for a comment, e.g. when the comment is
/// deleted before the task fires. Returns the number of tasks cancelled.
pub async fn cancel_pending_for_comment(
    pool: &PgPool,
    comment_id: Uuid,
) -> Result<u64, RepliesRepoError> {
    let result = sqlx::query(
        r#"
        UPDATE scheduled_replies
        SET status = 'cancelled'
        WHERE comment_id = $1 AND status = 'pending'
        "#,
    )
    .bind(comment_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

fn map_reply(row: sqlx::postgres::PgRow) -> Result<ScheduledReplyRecord, RepliesRepoError> {
    let status: String = row.try_get("status")?;
    Ok(ScheduledReplyRecord {
        id: row.try_get("id")?,
        comment_id: row.try_get("comment_id")?,
        post_id: row.try_get("post_id")?,
        fire_at: row.try_get("fire_at")?,
        status: ReplyStatus::parse(&status)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_matches_as_str() {
        for status in [ReplyStatus::Pending, ReplyStatus::Fired, ReplyStatus::Cancelled] {
            assert_eq!(ReplyStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(ReplyStatus::parse("firing").is_err());
    }
}
