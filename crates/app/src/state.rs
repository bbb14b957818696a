use std::sync::Arc;

use crate::config::AppConfig;
use quill_infra::db::DbPool;
use quill_infra::moderation::Moderate;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub moderator: Arc<dyn Moderate>,
}
