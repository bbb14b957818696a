use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;

use crate::config::AppConfig;
use crate::state::AppState;
use quill_infra::db::{connect_lazy, DbPoolError};
use quill_infra::moderation::HttpModerationClient;

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("db error: {0}")]
    Db(#[from] DbPoolError),
}

pub fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    let db = connect_lazy(&config.database_url)?;
    let http = Client::builder().timeout(config.moderation_timeout).build()?;
    let moderator = HttpModerationClient::new(
        http,
        config.moderation_url.clone(),
        config.moderation_token.clone(),
        config.moderation_retries,
    );
    Ok(AppState {
        config: Arc::new(config),
        db,
        moderator: Arc::new(moderator),
    })
}
