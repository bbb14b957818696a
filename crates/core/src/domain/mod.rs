pub mod analytics;
pub mod comments;
pub mod moderation;
pub mod posts;
pub mod users;
