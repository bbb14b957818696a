use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const MAX_TITLE_LEN: usize = 65;
pub const MAX_CONTENT_LEN: usize = 255;

/// Auto-reply delay bounds when the toggle is enabled.
pub const MIN_REPLY_DELAY_SECS: i64 = 1;
pub const MAX_REPLY_DELAY_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_REPLY_DELAY_SECS: i64 = 300;

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub auto_reply: bool,
    pub auto_reply_delay_secs: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
