use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;
use quill_infra::db::ping;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: DatabaseStatus,
    pub moderation: ModerationStatus,
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub reachable: bool,
}

#[derive(Debug, Serialize)]
pub struct ModerationStatus {
    pub configured: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let reachable = ping(&state.db).await.is_ok();
    let moderation_configured = state
        .config
        .moderation_token
        .as_ref()
        .is_some_and(|token| !token.is_empty());
    Json(HealthResponse {
        status: if reachable { "ok" } else { "degraded" },
        database: DatabaseStatus { reachable },
        moderation: ModerationStatus {
            configured: moderation_configured,
        },
    })
}
