// src/error.rs
// =============================================================================
// Errors that can happen while checking a single link.
//
// Every one of these is scoped to ONE link: it becomes one failed (or
// ignored) result and the crawl keeps going. Process-level problems (bad
// arguments, an unparsable seed URL) are handled in main.rs with anyhow.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - Enums with data: each variant carries the details we want to print
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    /// The address could not be parsed as a URL at all
    #[error("malformed URL {address:?}: {reason}")]
    MalformedUrl { address: String, reason: url::ParseError },

    /// mailto:, javascript:, tel: and friends
    #[error("not crawlable")]
    NotCrawlable,

    /// Connection refused, DNS failure, timeout, TLS failure...
    #[error("{method} {url}: {reason}")]
    Transport {
        method: &'static str,
        url: String,
        reason: String,
    },

    /// The server answered, but not with a 2xx status
    #[error("{method} {status} {text} {url}")]
    HttpStatus {
        method: &'static str,
        status: u16,
        text: String,
        url: String,
    },

    /// The response body could not be read as a document
    #[error("parse document at {url}: {reason}")]
    Parse { url: String, reason: String },
}

impl LinkError {
    /// Builds an HttpStatus error, filling in the canonical reason phrase
    pub fn http_status(method: &'static str, status: reqwest::StatusCode, url: &str) -> Self {
        LinkError::HttpStatus {
            method,
            status: status.as_u16(),
            text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            url: url.to_string(),
        }
    }

    /// Short machine-readable name, used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            LinkError::MalformedUrl { .. } => "malformed_url",
            LinkError::NotCrawlable => "not_crawlable",
            LinkError::Transport { .. } => "transport",
            LinkError::HttpStatus { .. } => "http_status",
            LinkError::Parse { .. } => "parse",
        }
    }

    /// Ignored links are reported under their own visibility flag
    pub fn is_ignored(&self) -> bool {
        matches!(self, LinkError::NotCrawlable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_http_status_display() {
        let err = LinkError::http_status("GET", StatusCode::NOT_FOUND, "http://example.com/gone");
        assert_eq!(err.to_string(), "GET 404 Not Found http://example.com/gone");
        assert_eq!(err.kind(), "http_status");
    }

    #[test]
    fn test_not_crawlable_is_ignored() {
        assert!(LinkError::NotCrawlable.is_ignored());
        let err = LinkError::Transport {
            method: "HEAD",
            url: "http://example.com".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(!err.is_ignored());
        assert_eq!(err.to_string(), "HEAD http://example.com: connection refused");
    }

    #[test]
    fn test_malformed_display_mentions_address() {
        let reason = url::Url::parse("http://[::1").unwrap_err();
        let err = LinkError::MalformedUrl {
            address: "http://[::1".to_string(),
            reason,
        };
        assert!(err.to_string().starts_with("malformed URL \"http://[::1\""));
    }
}
