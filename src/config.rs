// src/config.rs
// =============================================================================
// Settings for one crawl run.
//
// The CLI builds one of these from its flags (see cli.rs); tests build them
// directly, usually starting from CrawlConfig::default().
// =============================================================================

use std::time::Duration;
use tokio::sync::Semaphore;

/// Max. number of HTTP requests open at any given time
pub const DEFAULT_PARALLELISM: usize = 64;

/// Largest token pool tokio's semaphore can hold
pub const MAX_PARALLELISM: usize = Semaphore::MAX_PERMITS;

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Browser-like User-Agent; some sites block obvious bots outright
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:98.0) Gecko/20100101 Firefox/98.0";

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Deadline for each single HTTP request (not for the whole crawl)
    pub timeout: Duration,
    /// Size of the token pool limiting concurrent HTTP requests
    pub parallelism: usize,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            parallelism: DEFAULT_PARALLELISM,
            accept_invalid_certs: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
        }
    }
}
