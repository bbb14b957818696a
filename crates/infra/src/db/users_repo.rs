use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UsersRepoError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("sqlx error: {0}")]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for UsersRepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return UsersRepoError::DuplicateEmail;
            }
        }
        UsersRepoError::Sqlx(err)
    }
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

pub async fn insert_user(pool: &PgPool, new: &NewUser<'_>) -> Result<UserRecord, UsersRepoError> {
    let id = Uuid::new_v4();
    let row = sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(new.username)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.role)
    .fetch_one(pool)
    .await?;
    Ok(UserRecord {
        id,
        username: new.username.to_string(),
        email: new.email.to_string(),
        password_hash: new.password_hash.to_string(),
        role: new.role.to_string(),
        created_at: row.try_get("created_at")?,
    })
}

pub async fn find_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRecord>, UsersRepoError> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, password_hash, role, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    row.map(map_user).transpose()
}

pub async fn find_user_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<UserRecord>, UsersRepoError> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, password_hash, role, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(map_user).transpose()
}

fn map_user(row: sqlx::postgres::PgRow) -> Result<UserRecord, UsersRepoError> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: row.try_get("role")?,
        created_at: row.try_get("created_at")?,
    })
}
