use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CommentsRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub flagged: bool,
    pub system: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewComment<'a> {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub body: &'a str,
    pub flagged: bool,
    pub system: bool,
}

/// The moderation flag is part of the insert, so a comment is never visible
/// in an unmoderated state.
pub async fn insert_comment(
    pool: &PgPool,
    new: &NewComment<'_>,
) -> Result<CommentRecord, CommentsRepoError> {
    let id = Uuid::new_v4();
    let row = sqlx::query(
        r#"
        INSERT INTO comments (id, post_id, author_id, body, flagged, is_system)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(new.post_id)
    .bind(new.author_id)
    .bind(new.body)
    .bind(new.flagged)
    .bind(new.system)
    .fetch_one(pool)
    .await?;
    Ok(CommentRecord {
        id,
        post_id: new.post_id,
        author_id: new.author_id,
        body: new.body.to_string(),
        flagged: new.flagged,
        system: new.system,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn find_comment_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<CommentRecord>, CommentsRepoError> {
    let row = sqlx::query(
        r#"
        SELECT id, post_id, author_id, body, flagged, is_system, created_at
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(map_comment).transpose()
}

/// Published comments only, oldest first.
pub async fn list_published_comments(
    pool: &PgPool,
    post_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<CommentRecord>, CommentsRepoError> {
    let rows = sqlx::query(
        r#"
        SELECT id, post_id, author_id, body, flagged, is_system, created_at
        FROM comments
        WHERE post_id = $1 AND flagged = FALSE
        ORDER BY created_at ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(post_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(map_comment).collect()
}

/// Rewrites a comment's body together with its re-evaluated flag, so an
/// edited comment is never visible with a stale verdict.
pub async fn update_comment_body(
    pool: &PgPool,
    id: Uuid,
    body: &str,
    flagged: bool,
) -> Result<Option<CommentRecord>, CommentsRepoError> {
    let row = sqlx::query(
        r#"
        UPDATE comments
        SET body = $2, flagged = $3
        WHERE id = $1
        RETURNING id, post_id, author_id, body, flagged, is_system, created_at
        "#,
    )
    .bind(id)
    .bind(body)
    .bind(flagged)
    .fetch_optional(pool)
    .await?;
    row.map(map_comment).transpose()
}

pub async fn count_published_comments(
    pool: &PgPool,
    post_id: Uuid,
) -> Result<i64, CommentsRepoError> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS total
        FROM comments
        WHERE post_id = $1 AND flagged = FALSE
        "#,
    )
    .bind(post_id)
    .fetch_one(pool)
    .await?;
    Ok(row.try_get("total")?)
}

pub async fn delete_comment(pool: &PgPool, id: Uuid) -> Result<bool, CommentsRepoError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Per-UTC-day counts of published comments over the inclusive range.
/// Days without comments yield no row; the caller zero-fills.
pub async fn daily_published_counts(
    pool: &PgPool,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<Vec<(NaiveDate, i64)>, CommentsRepoError> {
    let rows = sqlx::query(
        r#"
        SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS total
        FROM comments
        WHERE flagged = FALSE
          AND (created_at AT TIME ZONE 'UTC')::date BETWEEN $1 AND $2
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(date_from)
    .bind(date_to)
    .fetch_all(pool)
    .await?;
    let mut counts = Vec::with_capacity(rows.len());
    for row in rows {
        counts.push((row.try_get("day")?, row.try_get("total")?));
    }
    Ok(counts)
}

fn map_comment(row: sqlx::postgres::PgRow) -> Result<CommentRecord, CommentsRepoError> {
    Ok(CommentRecord {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author_id: row.try_get("author_id")?,
        body: row.try_get("body")?,
        flagged: row.try_get("flagged")?,
        system: row.try_get("is_system")?,
        created_at: row.try_get("created_at")?,
    })
}
