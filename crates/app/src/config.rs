use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use quill_infra::moderation::client::DEFAULT_ENDPOINT;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_secs: i64,
    pub moderation_url: String,
    pub moderation_token: Option<String>,
    pub moderation_timeout: Duration,
    pub moderation_retries: u32,
    pub reply_poll_interval: Duration,
    pub auto_reply_body: String,
    pub cors_allow_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required variable: {0}")]
    Missing(&'static str),
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr_raw = read_string("QUILL_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let database_url = read_required("QUILL_DATABASE_URL")?;
        let jwt_secret = read_required("QUILL_JWT_SECRET")?;
        let jwt_ttl_secs = read_i64("QUILL_JWT_TTL_SECS", 3600)?;
        let moderation_url = read_string("QUILL_MODERATION_URL", DEFAULT_ENDPOINT);
        let moderation_token = read_optional_string("QUILL_MODERATION_TOKEN");
        let moderation_timeout_secs = read_u64("QUILL_MODERATION_TIMEOUT_SECS", 8)?;
        let moderation_retries = read_u64("QUILL_MODERATION_RETRIES", 2)? as u32;
        let reply_poll_interval_secs = read_u64("QUILL_REPLY_POLL_INTERVAL_SECS", 15)?;
        let auto_reply_body = read_string("QUILL_AUTO_REPLY_BODY", "Thanks for the comment!");
        let cors_allow_origins = parse_origin_list(&read_string("QUILL_CORS_ALLOW_ORIGINS", ""));

        Ok(Self {
            http_addr,
            database_url,
            jwt_secret,
            jwt_ttl_secs,
            moderation_url,
            moderation_token,
            moderation_timeout: Duration::from_secs(moderation_timeout_secs),
            moderation_retries,
            reply_poll_interval: Duration::from_secs(reply_poll_interval_secs),
            auto_reply_body,
            cors_allow_origins,
        })
    }
}

/// Loads `.env` from the working directory. Process environment wins over
/// file entries.
pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in contents.lines().filter_map(parse_dotenv_line) {
        if std::env::var_os(&key).is_none() {
            // Safety: invoked during startup before any threads are spawned.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn read_string(key: &'static str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_required(key: &'static str) -> Result<String, ConfigError> {
    match read_optional_string(key) {
        Some(value) => Ok(value),
        None => Err(ConfigError::Missing(key)),
    }
}

fn read_optional_string(key: &'static str) -> Option<String> {
    let value = std::env::var(key).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_i64(key: &'static str, default: i64) -> Result<i64, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .or_else(|| {
            value
                .strip_prefix('\'')
                .and_then(|inner| inner.strip_suffix('\''))
        })
        .unwrap_or(value);
    Some((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_dotenv_line, parse_origin_list};

    #[test]
    fn dotenv_line_basic() {
        assert_eq!(
            parse_dotenv_line("QUILL_JWT_SECRET=abc"),
            Some(("QUILL_JWT_SECRET".to_string(), "abc".to_string()))
        );
    }

    #[test]
    fn dotenv_line_export_and_quotes() {
        assert_eq!(
            parse_dotenv_line("export FOO=\"a b\""),
            Some(("FOO".to_string(), "a b".to_string()))
        );
        assert_eq!(
            parse_dotenv_line("FOO='a b'"),
            Some(("FOO".to_string(), "a b".to_string()))
        );
    }

    #[test]
    fn dotenv_line_skips_comments_and_blanks() {
        assert_eq!(parse_dotenv_line("# comment"), None);
        assert_eq!(parse_dotenv_line("   "), None);
        assert_eq!(parse_dotenv_line("=value"), None);
    }

    #[test]
    fn origin_list_splits_and_trims() {
        assert_eq!(
            parse_origin_list("https://a.example, https://b.example ,"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(parse_origin_list("").is_empty());
    }
}
