use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use quill_core::domain::users::Role;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid subject: {0}")]
    InvalidSubject(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidSubject(self.sub.clone()))
    }

    pub fn user_role(&self) -> Result<Role, JwtError> {
        Role::parse(&self.role).ok_or_else(|| JwtError::UnknownRole(self.role.clone()))
    }
}

pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    role: Role,
    ttl_secs: i64,
) -> Result<String, JwtError> {
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: Utc::now().timestamp().saturating_add(ttl_secs),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, JwtError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_verify_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token("secret", user_id, Role::User, 60).unwrap();
        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.user_role().unwrap(), Role::User);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("secret", Uuid::new_v4(), Role::Admin, 60).unwrap();
        assert!(verify_token("other", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token("secret", Uuid::new_v4(), Role::User, -120).unwrap();
        assert!(verify_token("secret", &token).is_err());
    }
}
