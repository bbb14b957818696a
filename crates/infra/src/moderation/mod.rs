pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use quill_core::domain::moderation::Verdict;

pub use client::HttpModerationClient;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("moderation credentials missing or rejected")]
    InvalidCredentials,
    #[error("moderation provider unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("moderation provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Classification seam shared by the comment routes and the auto-reply
/// worker. Provider failures propagate; text is never silently treated
/// as clean.
#[async_trait]
pub trait Moderate: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Verdict, ModerationError>;
}
