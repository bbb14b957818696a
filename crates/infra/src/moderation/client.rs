use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;

use quill_core::domain::moderation::{verdict_from_scores, CategoryScore, Verdict};

use super::{Moderate, ModerationError};

pub const DEFAULT_ENDPOINT: &str = "https://language.googleapis.com/v1/documents:moderateText";

const RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Client for the provider's text moderation endpoint. The wire format is
/// the provider's contract; only the category scores are interpreted here.
#[derive(Debug, Clone)]
pub struct HttpModerationClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct ModerateRequest<'a> {
    document: Document<'a>,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    doc_type: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ModerateResponse {
    #[serde(rename = "moderationCategories", default)]
    moderation_categories: Vec<CategoryScore>,
}

impl HttpModerationClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: String,
        token: Option<String>,
        max_retries: u32,
    ) -> Self {
        Self {
            http,
            endpoint,
            token,
            max_retries,
        }
    }

    async fn send_once(&self, token: &str, text: &str) -> Result<Verdict, SendError> {
        let request = ModerateRequest {
            document: Document {
                doc_type: "PLAIN_TEXT",
                content: text,
            },
        };
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(SendError::retryable)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SendError::Fatal(ModerationError::InvalidCredentials));
        }
        if status.is_server_error() {
            return Err(SendError::Retryable(format!("provider status {status}")));
        }
        if !status.is_success() {
            return Err(SendError::Fatal(ModerationError::ServiceUnavailable(
                format!("provider status {status}"),
            )));
        }
        let body: ModerateResponse = response
            .json()
            .await
            .map_err(|err| SendError::Fatal(ModerationError::InvalidResponse(err.to_string())))?;
        Ok(verdict_from_scores(&body.moderation_categories))
    }
}

#[async_trait]
impl Moderate for HttpModerationClient {
    async fn classify(&self, text: &str) -> Result<Verdict, ModerationError> {
        let token = self
            .token
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or(ModerationError::InvalidCredentials)?;

        let mut last_failure = String::new();
        for attempt in 0..=self.max_retries {
            match self.send_once(token, text).await {
                Ok(verdict) => return Ok(verdict),
                Err(SendError::Fatal(err)) => return Err(err),
                Err(SendError::Retryable(reason)) => {
                    warn!(attempt, reason = %reason, "moderation call failed");
                    last_failure = reason;
                }
            }
            if attempt < self.max_retries {
                tokio::time::sleep(RETRY_BACKOFF * (attempt + 1)).await;
            }
        }
        Err(ModerationError::ServiceUnavailable(last_failure))
    }
}

enum SendError {
    Retryable(String),
    Fatal(ModerationError),
}

impl SendError {
    fn retryable(err: reqwest::Error) -> SendError {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            SendError::Retryable(err.to_string())
        } else {
            SendError::Fatal(ModerationError::ServiceUnavailable(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_provider_categories() {
        let raw = r#"{
            "moderationCategories": [
                {"name": "Toxic", "confidence": 0.12},
                {"name": "Profanity", "confidence": 0.87}
            ]
        }"#;
        let parsed: ModerateResponse = serde_json::from_str(raw).unwrap();
        let verdict = verdict_from_scores(&parsed.moderation_categories);
        assert!(verdict.is_flagged());
    }

    #[test]
    fn response_without_categories_is_clean() {
        let parsed: ModerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(
            verdict_from_scores(&parsed.moderation_categories),
            Verdict::Clean
        );
    }
}
