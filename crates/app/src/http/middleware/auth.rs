use axum::body::Body;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use uuid::Uuid;

use crate::http::routes::error_response;
use crate::state::AppState;
use quill_core::domain::users::Role;
use quill_infra::auth::verify_token;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("bearer token required")]
    MissingToken,
    #[error("bearer token invalid or expired")]
    InvalidToken,
}

/// Authenticated caller, injected into request extensions by `require_auth`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

/// Guards everything under /api except the auth endpoints themselves.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path();
    if !path.starts_with("/api") || path.starts_with("/api/auth/") {
        return Ok(next.run(request).await);
    }

    let token = extract_bearer_token(&request).ok_or(AuthError::MissingToken)?;
    let claims =
        verify_token(&state.config.jwt_secret, &token).map_err(|_| AuthError::InvalidToken)?;
    let user = AuthUser {
        id: claims.user_id().map_err(|_| AuthError::InvalidToken)?,
        role: claims.user_role().map_err(|_| AuthError::InvalidToken)?,
    };
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn extract_bearer_token<B>(request: &Request<B>) -> Option<String> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let value = header.trim().strip_prefix("Bearer ")?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_response(
            axum::http::StatusCode::UNAUTHORIZED,
            "unauthorized",
            self.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_auth(value: &str) -> Request<()> {
        Request::builder()
            .header(AUTHORIZATION, value)
            .body(())
            .unwrap()
    }

    #[test]
    fn bearer_token_is_extracted() {
        let request = request_with_auth("Bearer abc.def.ghi");
        assert_eq!(
            extract_bearer_token(&request),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn non_bearer_scheme_is_ignored() {
        let request = request_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(extract_bearer_token(&request), None);
    }

    #[test]
    fn empty_bearer_value_is_ignored() {
        let request = request_with_auth("Bearer   ");
        assert_eq!(extract_bearer_token(&request), None);
    }
}
