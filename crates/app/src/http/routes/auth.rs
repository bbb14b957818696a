use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::routes::error_response;
use crate::state::AppState;
use quill_core::domain::users::{Role, User};
use quill_infra::auth::{hash_password, issue_token, verify_password, JwtError, PasswordError};
use quill_infra::db::{find_user_by_email, insert_user, NewUser, UserRecord, UsersRepoError};

pub const MAX_USERNAME_LEN: usize = 32;
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Error)]
pub enum AuthApiError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user has no usable role")]
    CorruptRole,
    #[error("password error: {0}")]
    Password(#[from] PasswordError),
    #[error("token error: {0}")]
    Jwt(#[from] JwtError),
    #[error("db error: {0}")]
    Db(UsersRepoError),
}

impl From<UsersRepoError> for AuthApiError {
    fn from(err: UsersRepoError) -> Self {
        match err {
            UsersRepoError::DuplicateEmail => AuthApiError::EmailTaken,
            other => AuthApiError::Db(other),
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AuthApiError> {
    let (username, email) = validate_registration(&request)?;
    let password_hash = hash_password(&request.password)?;
    let record = insert_user(
        &state.db,
        &NewUser {
            username,
            email,
            password_hash: &password_hash,
            role: Role::User.as_str(),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(to_user(record)?)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthApiError> {
    let record = find_user_by_email(&state.db, request.email.trim())
        .await?
        .ok_or(AuthApiError::InvalidCredentials)?;
    // The seeded system identity has an empty hash and can never log in.
    if record.password_hash.is_empty()
        || !verify_password(&request.password, &record.password_hash)?
    {
        return Err(AuthApiError::InvalidCredentials);
    }
    let role = Role::parse(&record.role).ok_or(AuthApiError::CorruptRole)?;
    let ttl = state.config.jwt_ttl_secs;
    let token = issue_token(&state.config.jwt_secret, record.id, role, ttl)?;
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
        expires_in: ttl,
    }))
}

fn validate_registration(request: &RegisterRequest) -> Result<(&str, &str), AuthApiError> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(AuthApiError::Validation("username must not be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AuthApiError::Validation("username is too long"));
    }
    let email = request.email.trim();
    if !is_plausible_email(email) {
        return Err(AuthApiError::Validation("email is not valid"));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthApiError::Validation(
            "password must be at least 8 characters",
        ));
    }
    Ok((username, email))
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn to_user(record: UserRecord) -> Result<User, AuthApiError> {
    let role = Role::parse(&record.role).ok_or(AuthApiError::CorruptRole)?;
    Ok(User {
        id: record.id,
        username: record.username,
        email: record.email,
        role,
        created_at: record.created_at,
    })
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AuthApiError::EmailTaken => (StatusCode::CONFLICT, "conflict"),
            AuthApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AuthApiError::CorruptRole
            | AuthApiError::Password(_)
            | AuthApiError::Jwt(_)
            | AuthApiError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        error_response(status, code, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        let req = request("ada", "ada@example.com", "long-enough");
        assert!(validate_registration(&req).is_ok());
    }

    #[test]
    fn empty_username_rejected() {
        let req = request("   ", "ada@example.com", "long-enough");
        assert!(matches!(
            validate_registration(&req),
            Err(AuthApiError::Validation(_))
        ));
    }

    #[test]
    fn short_password_rejected() {
        let req = request("ada", "ada@example.com", "short");
        assert!(matches!(
            validate_registration(&req),
            Err(AuthApiError::Validation(_))
        ));
    }

    #[test]
    fn email_shapes() {
        assert!(is_plausible_email("a@b.example"));
        assert!(!is_plausible_email("not-an-email"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("a@nodot"));
        assert!(!is_plausible_email("a@.example"));
    }
}
