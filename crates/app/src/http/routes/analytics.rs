use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::http::routes::error_response;
use crate::state::AppState;
use quill_core::domain::analytics::{fill_daily_gaps, DailyCount};
use quill_core::types::date_range::DateRange;
use quill_infra::db::{daily_published_counts, CommentsRepoError};

#[derive(Debug, Deserialize)]
pub struct BreakdownParams {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

#[derive(Debug, Error)]
pub enum AnalyticsApiError {
    #[error("invalid date range: date_from must not be after date_to")]
    InvalidRange,
    #[error("db error: {0}")]
    Db(#[from] CommentsRepoError),
}

/// Per-day published-comment counts over the inclusive range, one entry per
/// calendar day with zero-filled gaps.
pub async fn comments_daily_breakdown(
    State(state): State<AppState>,
    Query(params): Query<BreakdownParams>,
) -> Result<Json<Vec<DailyCount>>, AnalyticsApiError> {
    let range = DateRange::new(params.date_from, params.date_to)
        .map_err(|_| AnalyticsApiError::InvalidRange)?;
    let rows = daily_published_counts(&state.db, range.start(), range.end()).await?;
    Ok(Json(fill_daily_gaps(&range, &rows)))
}

impl IntoResponse for AnalyticsApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AnalyticsApiError::InvalidRange => (StatusCode::BAD_REQUEST, "invalid_range"),
            AnalyticsApiError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        error_response(status, code, self.to_string())
    }
}
