use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PostsRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct PostRecord {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub auto_reply: bool,
    pub auto_reply_delay_secs: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewPost<'a> {
    pub author_id: Uuid,
    pub title: &'a str,
    pub content: &'a str,
    pub auto_reply: bool,
    pub auto_reply_delay_secs: i64,
}

#[derive(Debug)]
pub struct PostUpdate<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub auto_reply: bool,
    pub auto_reply_delay_secs: i64,
}

pub async fn insert_post(pool: &PgPool, new: &NewPost<'_>) -> Result<PostRecord, PostsRepoError> {
    let id = Uuid::new_v4();
    let row = sqlx::query(
        r#"
        INSERT INTO posts (id, author_id, title, content, auto_reply, auto_reply_delay_secs)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(new.author_id)
    .bind(new.title)
    .bind(new.content)
    .bind(new.auto_reply)
    .bind(new.auto_reply_delay_secs)
    .fetch_one(pool)
    .await?;
    Ok(PostRecord {
        id,
        author_id: new.author_id,
        title: new.title.to_string(),
        content: new.content.to_string(),
        auto_reply: new.auto_reply,
        auto_reply_delay_secs: new.auto_reply_delay_secs,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn find_post_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<PostRecord>, PostsRepoError> {
    let row = sqlx::query(
        r#"
        SELECT id, author_id, title, content, auto_reply, auto_reply_delay_secs,
               created_at, updated_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(map_post).transpose()
}

pub async fn list_posts(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostRecord>, PostsRepoError> {
    let rows = sqlx::query(
        r#"
        SELECT id, author_id, title, content, auto_reply, auto_reply_delay_secs,
               created_at, updated_at
        FROM posts
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(map_post).collect()
}

pub async fn update_post(
    pool: &PgPool,
    id: Uuid,
    update: &PostUpdate<'_>,
) -> Result<Option<PostRecord>, PostsRepoError> {
    let row = sqlx::query(
        r#"
        UPDATE posts
        SET title = $2,
            content = $3,
            auto_reply = $4,
            auto_reply_delay_secs = $5,
            updated_at = now()
        WHERE id = $1
        RETURNING id, author_id, title, content, auto_reply, auto_reply_delay_secs,
                  created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(update.title)
    .bind(update.content)
    .bind(update.auto_reply)
    .bind(update.auto_reply_delay_secs)
    .fetch_optional(pool)
    .await?;
    row.map(map_post).transpose()
}

pub async fn delete_post(pool: &PgPool, id: Uuid) -> Result<bool, PostsRepoError> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

fn map_post(row: sqlx::postgres::PgRow) -> Result<PostRecord, PostsRepoError> {
    Ok(PostRecord {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        auto_reply: row.try_get("auto_reply")?,
        auto_reply_delay_secs: row.try_get("auto_reply_delay_secs")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
