use thiserror::Error;

use crate::catalog::Site;

/// Longest slice of an unparseable body kept for diagnostics.
pub const RAW_PREVIEW_LEN: usize = 500;

/// HTTP statuses the transport retries automatically.
pub const RETRY_STATUSES: [u16; 5] = [500, 502, 503, 504, 429];

/// Error types shared across jobsift crates.
#[derive(Error, Debug)]
pub enum AppError {
    /// A request configuration could not be used.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request could not be built or sent.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Upstream answered with a non-ok status.
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Network/connection error.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// A response body could not be read as the expected structure.
    #[error("Parse error: {message}. Raw: {raw}")]
    Parse { message: String, raw: String },

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No adapter is registered for a catalog site.
    #[error("No adapter registered for site {0}")]
    NoAdapter(Site),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Build a [`AppError::Parse`] keeping at most [`RAW_PREVIEW_LEN`] chars of the body.
    pub fn parse(message: impl Into<String>, raw: &str) -> Self {
        AppError::Parse {
            message: message.into(),
            raw: truncate(raw, RAW_PREVIEW_LEN),
        }
    }

    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Network(_) | AppError::Timeout(_) => true,
            AppError::HttpStatus { status, .. } => RETRY_STATUSES.contains(status),
            AppError::Http(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }
}

fn truncate(raw: &str, max_chars: usize) -> String {
    match raw.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(AppError::Network("reset".into()).is_retryable());
        assert!(AppError::Timeout(10).is_retryable());
        assert!(
            AppError::HttpStatus {
                status: 503,
                url: "https://example.com".into(),
            }
            .is_retryable()
        );
        assert!(
            AppError::HttpStatus {
                status: 429,
                url: "https://example.com".into(),
            }
            .is_retryable()
        );
        assert!(
            !AppError::HttpStatus {
                status: 404,
                url: "https://example.com".into(),
            }
            .is_retryable()
        );
        assert!(!AppError::Config("bad".into()).is_retryable());
    }

    #[test]
    fn test_parse_error_truncates_raw() {
        let raw = "x".repeat(RAW_PREVIEW_LEN + 100);
        match AppError::parse("unexpected shape", &raw) {
            AppError::Parse { raw, .. } => {
                assert_eq!(raw.len(), RAW_PREVIEW_LEN + 3);
                assert!(raw.ends_with("..."));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_keeps_short_raw() {
        let err = AppError::parse("bad", "{}");
        assert_eq!(err.to_string(), "Parse error: bad. Raw: {}");
    }
}
