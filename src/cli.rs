// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Usage:
//   checklinks [OPTIONS] <URL>
//
// The URL may leave out its scheme; "example.com" means "http://example.com".
// =============================================================================

use checklinks::config::{CrawlConfig, DEFAULT_PARALLELISM, DEFAULT_TIMEOUT_SECS, MAX_PARALLELISM};
use checklinks::report::{OutputFormat, Visibility};
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "checklinks",
    version,
    about = "Crawls a website and reports the status of every link it finds",
    long_about = "checklinks starts at one page, follows every link to pages on the same host, \
                  and checks every link it finds along the way. Links to other hosts are checked \
                  once but not followed."
)]
pub struct Cli {
    /// Page to start crawling from (e.g., https://example.com)
    ///
    /// http:// is assumed if no scheme is given
    pub url: String,

    /// Request timeout in seconds, per request (at least 1)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Max. number of HTTP requests open at any given time
    #[arg(
        long,
        default_value_t = DEFAULT_PARALLELISM as u64,
        value_parser = clap::value_parser!(u64).range(1..=MAX_PARALLELISM as u64)
    )]
    pub parallelism: u64,

    /// Report succeeded links (OK)
    #[arg(long)]
    pub success: bool,

    /// Report ignored links (e.g. mailto:...)
    #[arg(long)]
    pub ignored: bool,

    /// Report failed links (e.g. 404); this is the default
    #[arg(long, overrides_with = "nofailed")]
    pub failed: bool,

    /// Don't report failed links
    #[arg(long, overrides_with = "failed")]
    pub nofailed: bool,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Output one JSON object per result instead of text lines
    #[arg(long)]
    pub json: bool,

    /// Log crawl progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    // The seed address with a scheme in front of it
    pub fn seed_address(&self) -> String {
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            self.url.clone()
        } else {
            format!("http://{}", self.url)
        }
    }

    pub fn visibility(&self) -> Visibility {
        Visibility {
            succeeded: self.success,
            ignored: self.ignored,
            failed: !self.nofailed,
        }
    }

    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            timeout: Duration::from_secs(self.timeout),
            parallelism: self.parallelism as usize,
            accept_invalid_certs: self.insecure,
            ..CrawlConfig::default()
        }
    }
}
