// src/report.rs
// =============================================================================
// This module turns check results into output lines.
//
// Every link the crawler touches produces exactly one LinkCheckResult.
// The Reporter decides which of them the user wants to see (succeeded,
// ignored, failed) and prints them either as text or as JSON lines.
//
// Output formats:
//   text: OK "https://example.com/"
//         FAIL "https://example.com/gone": GET 404 Not Found https://example.com/gone
//   json: {"status":"failed","url":"...","source":"...","kind":"http_status","error":"..."}
//
// Rust concepts:
// - Generics: Reporter<W> writes to anything implementing io::Write, so
//   tests can capture output in a Vec<u8>
// - Channels: the reporter runs as its own task, reading results as they
//   arrive from the crawler
// =============================================================================

use crate::error::LinkError;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use tokio::sync::mpsc::UnboundedReceiver;

// The outcome of processing one link
#[derive(Debug)]
pub struct LinkCheckResult {
    /// The URL that was checked (or the raw address if it never became one)
    pub url: String,
    /// The page the link was found on
    pub source: String,
    /// None means the link is fine
    pub error: Option<LinkError>,
}

// Which bucket a result falls into, for filtering and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Succeeded,
    Ignored,
    Failed,
}

impl LinkCheckResult {
    pub fn ok(url: impl Into<String>, source: impl Into<String>) -> Self {
        LinkCheckResult {
            url: url.into(),
            source: source.into(),
            error: None,
        }
    }

    pub fn failed(url: impl Into<String>, source: impl Into<String>, error: LinkError) -> Self {
        LinkCheckResult {
            url: url.into(),
            source: source.into(),
            error: Some(error),
        }
    }

    pub fn verdict(&self) -> Verdict {
        match &self.error {
            None => Verdict::Succeeded,
            Some(e) if e.is_ignored() => Verdict::Ignored,
            Some(_) => Verdict::Failed,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for LinkCheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => write!(f, "OK \"{}\"", self.url),
            Some(e) => write!(f, "FAIL \"{}\": {}", self.url, e),
        }
    }
}

// One JSON line of output
#[derive(Serialize)]
struct JsonRecord<'a> {
    status: &'static str,
    url: &'a str,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a LinkCheckResult> for JsonRecord<'a> {
    fn from(result: &'a LinkCheckResult) -> Self {
        let status = match result.verdict() {
            Verdict::Succeeded => "ok",
            Verdict::Ignored => "ignored",
            Verdict::Failed => "failed",
        };
        JsonRecord {
            status,
            url: &result.url,
            source: &result.source,
            kind: result.error.as_ref().map(LinkError::kind),
            error: result.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Which kinds of results get printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub succeeded: bool,
    pub ignored: bool,
    pub failed: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility {
            succeeded: false,
            ignored: false,
            failed: true,
        }
    }
}

impl Visibility {
    pub fn shows(&self, verdict: Verdict) -> bool {
        match verdict {
            Verdict::Succeeded => self.succeeded,
            Verdict::Ignored => self.ignored,
            Verdict::Failed => self.failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub struct Reporter<W: Write> {
    out: W,
    visibility: Visibility,
    format: OutputFormat,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, visibility: Visibility, format: OutputFormat) -> Self {
        Reporter {
            out,
            visibility,
            format,
        }
    }

    // Prints one result if its verdict is visible; returns whether it printed
    pub fn report(&mut self, result: &LinkCheckResult) -> Result<bool> {
        if !self.visibility.shows(result.verdict()) {
            return Ok(false);
        }

        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", result)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &JsonRecord::from(result))
                    .context("Failed to serialize result")?;
                writeln!(self.out)?;
            }
        }
        Ok(true)
    }

    // Reports every result until the crawler drops its end of the channel
    //
    // Returns the writer so callers (and tests) can inspect what was written.
    pub async fn run(mut self, mut results: UnboundedReceiver<LinkCheckResult>) -> Result<W> {
        while let Some(result) = results.recv().await {
            self.report(&result)?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}
