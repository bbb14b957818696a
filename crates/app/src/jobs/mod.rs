pub mod scheduler;
pub mod tasks;

use thiserror::Error;
use tracing::info;

use crate::state::AppState;
use quill_infra::db::RepliesRepoError;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("replies db error: {0}")]
    Replies(#[from] RepliesRepoError),
}

pub async fn start(state: AppState) -> Result<(), JobError> {
    let poll_interval = state.config.reply_poll_interval;
    scheduler::run_interval("auto_reply", poll_interval, move || {
        let state = state.clone();
        async move {
            let stats = tasks::auto_reply::run(&state).await?;
            if stats.claimed > 0 {
                info!(?stats, "auto-reply pass complete");
            }
            Ok(())
        }
    })
    .await
}
