use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const MAX_BODY_LEN: usize = 255;

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub flagged: bool,
    pub system: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentPage {
    pub post_id: Uuid,
    pub total: usize,
    pub comments: Vec<Comment>,
}
