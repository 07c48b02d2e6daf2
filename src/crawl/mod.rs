// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Concurrent crawling starting from one seed URL
// - Internal links (same host) are crawled for more links
// - External links are checked once, never followed
// - Every URL is fetched at most once per run
// - A fixed pool of tokens caps how many HTTP requests run at once
//
// Submodules:
// - link: classifies and qualifies links (no network)
// - queue: the Dispatcher, which owns the visited set and spawns tasks
// - task: node and leaf tasks, the actual per-link work
// =============================================================================

pub mod link;
mod queue;
mod task;

pub use link::{is_crawlable, is_internal, qualify, Address, Link, QualifiedLink};
pub use queue::{CrawlState, CrawlSummary, Dispatcher};

use crate::checker::Gateway;
use crate::config::CrawlConfig;
use crate::report::LinkCheckResult;
use tokio::sync::mpsc::UnboundedSender;
use url::Url;

// Crawls a website starting from `seed`
//
// Parameters:
//   seed: the first page; its host decides what counts as internal
//   gateway: how pages are fetched (HttpGateway for real runs)
//   config: parallelism and friends
//   results: every LinkCheckResult is sent here as soon as it is known
//
// Returns: the summary once no task is outstanding anymore
pub async fn crawl_website<G: Gateway>(
    seed: Url,
    gateway: G,
    config: &CrawlConfig,
    results: UnboundedSender<LinkCheckResult>,
) -> CrawlSummary {
    Dispatcher::new(gateway, config, results).run(seed).await
}
