// src/checker/http.rs
// =============================================================================
// This module talks HTTP on behalf of the crawler.
//
// Two operations:
// - fetch_document: GET a page we want to read links from
// - check_link: HEAD a page we only want to know is alive, falling back to
//   GET if the server says HEAD is not allowed (405)
//
// Both go through the Gateway trait so the crawl logic can be tested with
// an in-memory fake instead of a real network.
//
// Rust concepts:
// - Traits: a shared interface for the real client and test fakes
// - BoxFuture: lets a trait method be async and still be object-safe
// - Ownership: the response is consumed by .text(), so the body is always
//   released when the function returns
// =============================================================================

use crate::checker::html::Document;
use crate::config::CrawlConfig;
use crate::error::LinkError;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use url::Url;

// What the crawler needs from an HTTP client
pub trait Gateway: Send + Sync + 'static {
    /// GETs the page and returns its body; non-2xx answers are errors
    fn fetch_document<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<Document, LinkError>>;

    /// HEADs the page (GET on 405) and returns the status; any status is Ok
    fn check_link<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<StatusCheck, LinkError>>;
}

// The status a link answered with, and the method that got the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCheck {
    pub method: &'static str,
    pub status: StatusCode,
}

// The real gateway, backed by one shared reqwest client
//
// The client keeps a connection pool, so we build it once per crawl and
// let every task borrow it.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
}

impl HttpGateway {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid User-Agent header")?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(HttpGateway { client })
    }

    async fn get_document(&self, url: &Url) -> Result<Document, LinkError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error("GET", url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkError::http_status("GET", status, url.as_str()));
        }

        let body = response.text().await.map_err(|e| LinkError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Document::new(body))
    }

    async fn head_or_get(&self, url: &Url) -> Result<StatusCheck, LinkError> {
        let status = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|e| transport_error("HEAD", url, e))?
            .status();

        if status != StatusCode::METHOD_NOT_ALLOWED {
            return Ok(StatusCheck { method: "HEAD", status });
        }

        tracing::debug!(%url, "HEAD not allowed, retrying with GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error("GET", url, e))?;
        Ok(StatusCheck {
            method: "GET",
            status: response.status(),
        })
    }
}

impl Gateway for HttpGateway {
    fn fetch_document<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<Document, LinkError>> {
        self.get_document(url).boxed()
    }

    fn check_link<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<StatusCheck, LinkError>> {
        self.head_or_get(url).boxed()
    }
}

// Turns a reqwest error into a transport error, naming the failure mode
// when reqwest tells us what it was
fn transport_error(method: &'static str, url: &Url, error: reqwest::Error) -> LinkError {
    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    LinkError::Transport {
        method,
        url: url.to_string(),
        reason,
    }
}
