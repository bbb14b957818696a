use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),
}
