//! Error taxonomy for the query path
//!
//! Every layer below the typeahead session reports failures through
//! [`SearchError`]. The session itself never fails on a query error; it logs
//! the error, counts it and goes back to idle.

use thiserror::Error;

/// Maximum number of characters of an offending body kept for diagnostics
pub const SNIPPET_LIMIT: usize = 200;

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, SearchError>;

/// Failure of a single search query
#[derive(Debug, Error)]
pub enum SearchError {
    /// The caller supplied an empty or blank search term or application name
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// Network, DNS, TLS or non-2xx HTTP failure
    #[error("transport error for {uri} (status: {}): {message}", display_status(.status))]
    Transport {
        uri: String,
        status: Option<u16>,
        message: String,
    },

    /// The response body is not JSON, or not a JSON object
    #[error("decode error: {message}, body_snippet: {snippet}")]
    Decode { message: String, snippet: String },
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

impl SearchError {
    pub fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    pub fn transport(uri: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            uri: uri.into(),
            status,
            message: message.into(),
        }
    }

    /// Build a decode error, keeping a truncated copy of the offending body
    pub fn decode(message: impl Into<String>, body: &str) -> Self {
        Self::Decode {
            message: message.into(),
            snippet: snippet(body),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// HTTP status of a transport failure, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether a caller-side retry policy could reasonably try again.
    ///
    /// Only transport failures qualify: connection-level errors, 429 and 5xx.
    /// A malformed body or a bad argument will not get better by retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } => true,
            Self::Transport {
                status: Some(code), ..
            } => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        let uri = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        let status = err.status().map(|s| s.as_u16());
        Self::Transport {
            uri,
            status,
            message: err.to_string(),
        }
    }
}

/// Truncate a body to [`SNIPPET_LIMIT`] characters on a char boundary
pub fn snippet(body: &str) -> String {
    match body.char_indices().nth(SNIPPET_LIMIT) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let body = "é".repeat(SNIPPET_LIMIT + 10);
        let cut = snippet(&body);
        assert_eq!(cut.chars().count(), SNIPPET_LIMIT + 1);
        assert!(cut.ends_with('…'));

        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(SearchError::transport("http://x", None, "dns").is_retryable());
        assert!(SearchError::transport("http://x", Some(503), "busy").is_retryable());
        assert!(SearchError::transport("http://x", Some(429), "slow down").is_retryable());
        assert!(!SearchError::transport("http://x", Some(404), "missing").is_retryable());
        assert!(!SearchError::decode("bad", "not json").is_retryable());
        assert!(!SearchError::invalid_argument("term", "empty").is_retryable());
    }

    #[test]
    fn test_transport_display_carries_context() {
        let err = SearchError::transport("https://api.example/?q=a", Some(500), "boom");
        let text = err.to_string();
        assert!(text.contains("https://api.example/?q=a"));
        assert!(text.contains("500"));
        assert_eq!(err.status(), Some(500));
    }
}
