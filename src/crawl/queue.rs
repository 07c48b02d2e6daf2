// src/crawl/queue.rs
// =============================================================================
// This module implements the crawl's work queue: the Dispatcher.
//
// How it works:
// 1. The seed URL is admitted: marked visited, outstanding count = 1,
//    a node task is spawned for it
// 2. Tasks send Events back over one channel:
//    - Discovered(link): admit it if we haven't seen its URL yet
//    - Checked(result): forward it to the reporter
//    - Finished: one task is done, outstanding count goes down
// 3. When the outstanding count reaches zero, nothing can discover new
//    links anymore, so the crawl is over
//
// The dispatcher is the ONLY owner of the visited set and the counter.
// Tasks never touch them, so no locks are needed: every check-and-insert
// happens inside this one loop, one event at a time.
//
// The channel is unbounded so that a task sending an event never waits on
// the dispatcher. Concurrency is limited where it matters - at the HTTP
// calls, by the token pool in TaskContext.
//
// Rust concepts:
// - mpsc channels: many senders (tasks), one receiver (dispatcher)
// - tokio::spawn: runs each task concurrently on the runtime
// - HashSet: O(1) "have we seen this URL?"
// =============================================================================

use crate::checker::Gateway;
use crate::config::{CrawlConfig, MAX_PARALLELISM};
use crate::crawl::link::Link;
use crate::crawl::task::{self, Event, TaskContext};
use crate::report::{LinkCheckResult, Verdict};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;
use url::Url;

/// Lifecycle of one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CrawlState {
    /// At least one task is outstanding
    #[default]
    Running,
    /// The last task finished; leftover events are being flushed
    Draining,
    Terminated,
}

/// Counts for one finished crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// URLs that got a task (each one exactly once)
    pub admitted: usize,
    /// Finished events received; equals `admitted` for a clean run
    pub completed: usize,
    pub succeeded: usize,
    pub ignored: usize,
    pub failed: usize,
    /// Where the dispatcher stopped; Terminated once run() returns
    pub state: CrawlState,
}

impl CrawlSummary {
    fn count(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Succeeded => self.succeeded += 1,
            Verdict::Ignored => self.ignored += 1,
            Verdict::Failed => self.failed += 1,
        }
    }
}

pub struct Dispatcher<G> {
    ctx: Arc<TaskContext<G>>,
    inbox: UnboundedReceiver<Event>,
    results: UnboundedSender<LinkCheckResult>,
    visited: HashSet<String>,
    outstanding: usize,
    state: CrawlState,
    summary: CrawlSummary,
}

impl<G: Gateway> Dispatcher<G> {
    // Results are forwarded to `results` as they arrive; the sender is
    // dropped when the crawl ends, which tells the reporter to stop.
    pub fn new(gateway: G, config: &CrawlConfig, results: UnboundedSender<LinkCheckResult>) -> Self {
        let (events, inbox) = mpsc::unbounded_channel();
        let ctx = TaskContext {
            gateway,
            // A pool of zero would never hand out a token, and tokio
            // panics on pools above MAX_PARALLELISM
            tokens: Semaphore::new(config.parallelism.clamp(1, MAX_PARALLELISM)),
            events,
        };

        Dispatcher {
            ctx: Arc::new(ctx),
            inbox,
            results,
            visited: HashSet::new(),
            outstanding: 0,
            state: CrawlState::Running,
            summary: CrawlSummary::default(),
        }
    }

    // Crawls everything reachable from `seed` and returns the counts
    pub async fn run(mut self, seed: Url) -> CrawlSummary {
        tracing::info!(%seed, "crawl started");
        self.admit(Link::seed(seed));

        while self.state == CrawlState::Running {
            // We hold a sender in ctx, so recv() can't return None here
            let Some(event) = self.inbox.recv().await else {
                break;
            };
            self.handle(event);
        }

        self.drain();
        self.summary.state = self.state;
        tracing::info!(
            admitted = self.summary.admitted,
            completed = self.summary.completed,
            succeeded = self.summary.succeeded,
            ignored = self.summary.ignored,
            failed = self.summary.failed,
            "crawl finished"
        );
        self.summary
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Discovered(link) => self.admit(link),
            Event::Checked(result) => self.forward(result),
            Event::Finished => self.finish_one(),
        }
    }

    // Spawns a task for the link unless its URL was admitted before
    fn admit(&mut self, link: Link) {
        let link = link.qualify();
        if !self.visited.insert(link.url.as_str().to_string()) {
            tracing::trace!(url = %link.url, "already visited, dropping");
            return;
        }

        self.outstanding += 1;
        self.summary.admitted += 1;
        tracing::debug!(
            url = %link.url,
            internal = link.internal,
            outstanding = self.outstanding,
            "admitted"
        );

        let ctx = Arc::clone(&self.ctx);
        if link.internal {
            tokio::spawn(task::process_node(ctx, link));
        } else {
            tokio::spawn(task::process_leaf(ctx, link));
        }
    }

    fn forward(&mut self, result: LinkCheckResult) {
        self.summary.count(result.verdict());
        // A reporter that went away doesn't stop the crawl
        let _ = self.results.send(result);
    }

    fn finish_one(&mut self) {
        self.summary.completed += 1;
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.outstanding == 0 {
            tracing::debug!("no tasks outstanding, draining");
            self.state = CrawlState::Draining;
        }
    }

    // Every task sends its results before its Finished event, so this
    // normally finds nothing; it is here so no result is ever lost.
    fn drain(&mut self) {
        self.inbox.close();
        self.state = CrawlState::Draining;
        while let Ok(event) = self.inbox.try_recv() {
            match event {
                Event::Checked(result) => self.forward(result),
                Event::Finished => {
                    // Counted so a task finishing twice shows up in the summary
                    self.summary.completed += 1;
                    tracing::warn!("task finished after the crawl drained");
                }
                Event::Discovered(_) => {
                    tracing::warn!("link discovered after the crawl drained");
                }
            }
        }
        self.state = CrawlState::Terminated;
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Who can touch the visited set?
//    - Only the dispatcher; tasks just send Discovered events
//    - "check, then insert, then spawn" for one link finishes before the
//      next event is even read, so two tasks never get the same URL
//
// 2. Why count outstanding tasks instead of waiting on the queue?
//    - The queue is never "done" on its own: a running task might still
//      find new links
//    - Only when no task is running can no new work appear
//
// 3. What is let-else?
//    - let Some(event) = ... else { break; } binds `event` or runs the else
//      block, which must leave the loop or function
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{Document, StatusCheck};
    use crate::error::LinkError;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    // In-memory website: URL -> HTML body, plus status codes for leaf links
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, String>,
        statuses: HashMap<String, u16>,
        panics_on: Option<String>,
        fetched: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeSite {
        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn status(mut self, url: &str, status: u16) -> Self {
            self.statuses.insert(url.to_string(), status);
            self
        }

        async fn hit(&self, url: &Url) {
            self.fetched.lock().unwrap().push(url.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.panics_on.as_deref() == Some(url.as_str()) {
                panic!("fake gateway blew up on {}", url);
            }
        }
    }

    impl Gateway for Arc<FakeSite> {
        fn fetch_document<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<Document, LinkError>> {
            async move {
                self.hit(url).await;
                match self.pages.get(url.as_str()) {
                    Some(html) => Ok(Document::new(html.clone())),
                    None => Err(LinkError::http_status("GET", StatusCode::NOT_FOUND, url.as_str())),
                }
            }
            .boxed()
        }

        fn check_link<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<StatusCheck, LinkError>> {
            async move {
                self.hit(url).await;
                let code = self.statuses.get(url.as_str()).copied().unwrap_or(200);
                Ok(StatusCheck {
                    method: "HEAD",
                    status: StatusCode::from_u16(code).unwrap(),
                })
            }
            .boxed()
        }
    }

    async fn crawl(site: FakeSite, parallelism: usize) -> (Arc<FakeSite>, CrawlSummary, Vec<LinkCheckResult>) {
        let site = Arc::new(site);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = CrawlConfig {
            parallelism,
            ..CrawlConfig::default()
        };
        let dispatcher = Dispatcher::new(Arc::clone(&site), &config, tx);
        let summary = dispatcher.run(Url::parse("http://site.test/").unwrap()).await;

        let mut results = Vec::new();
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        (site, summary, results)
    }

    #[tokio::test]
    async fn test_each_url_fetched_once_in_a_cycle() {
        let site = FakeSite::default()
            .page("http://site.test/", r#"<a href="/a">a</a><a href="/b">b</a><a href="/">home</a>"#)
            .page("http://site.test/a", r#"<a href="/b">b</a><a href="/">home</a><a href="/a#top">me</a>"#)
            .page("http://site.test/b", r#"<a href="/a">a</a><a href="http://site.test/">home</a>"#);

        let (site, summary, results) = crawl(site, 8).await;

        let mut fetched = site.fetched.lock().unwrap().clone();
        fetched.sort();
        assert_eq!(fetched, vec!["http://site.test/", "http://site.test/a", "http://site.test/b"]);
        assert_eq!(summary.admitted, 3);
        assert_eq!(summary.succeeded, 3);
        // Revisits are dropped silently
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(LinkCheckResult::is_ok));
    }

    #[tokio::test]
    async fn test_internal_and_external_results() {
        let site = FakeSite::default()
            .page(
                "http://site.test/",
                r#"<a href="/ok">ok</a><a href="/missing">missing</a>
                   <a href="https://other.test/">ext</a><a href="https://other.test/gone">gone</a>"#,
            )
            .page("http://site.test/ok", "<p>nothing here</p>")
            .status("https://other.test/gone", 404);

        let (site, summary, results) = crawl(site, 8).await;

        assert_eq!(results.len(), 5);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 2);
        let failed: HashSet<_> = results.iter().filter(|r| !r.is_ok()).map(|r| r.url.as_str()).collect();
        assert_eq!(
            failed,
            HashSet::from(["http://site.test/missing", "https://other.test/gone"])
        );
        // External links are checked but never crawled
        assert_eq!(site.fetched.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_non_crawlable_and_malformed_links_are_reported_not_admitted() {
        let site = FakeSite::default().page(
            "http://site.test/",
            r#"<a href="mailto:me@site.test">mail</a>
               <a href="javascript:void(0)">js</a>
               <a href="http://[::1">broken</a>"#,
        );

        let (site, summary, results) = crawl(site, 8).await;

        assert_eq!(summary.admitted, 1);
        assert_eq!(summary.ignored, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(site.fetched.lock().unwrap().len(), 1);

        let ignored: Vec<_> = results
            .iter()
            .filter(|r| r.verdict() == Verdict::Ignored)
            .collect();
        assert!(ignored.iter().any(|r| r.url == "mailto:me@site.test"));
        assert!(ignored.iter().all(|r| r.source == "http://site.test/"));

        let malformed = results
            .iter()
            .find(|r| matches!(r.error, Some(LinkError::MalformedUrl { .. })))
            .unwrap();
        assert_eq!(malformed.url, "http://[::1");
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_token_pool() {
        let links: String = (0..40)
            .map(|i| format!(r#"<a href="https://ext{i}.test/">x</a>"#))
            .collect();
        let site = FakeSite::default().page("http://site.test/", &links);

        let (site, summary, results) = crawl(site, 4).await;

        assert_eq!(results.len(), 41);
        assert_eq!(summary.admitted, 41);
        let max = site.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 4, "saw {max} requests in flight");
        assert!(max >= 1);
    }

    #[tokio::test]
    async fn test_seed_failure_ends_crawl() {
        let (_, summary, results) = crawl(FakeSite::default(), 8).await;
        assert_eq!(summary.admitted, 1);
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].error,
            Some(LinkError::HttpStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_panicking_task_still_completes() {
        let mut site = FakeSite::default()
            .page("http://site.test/", r#"<a href="/boom">x</a><a href="/fine">y</a>"#)
            .page("http://site.test/fine", "<p>ok</p>");
        site.panics_on = Some("http://site.test/boom".to_string());

        let (_, summary, results) = tokio::time::timeout(Duration::from_secs(5), crawl(site, 8))
            .await
            .expect("crawl must terminate even when a task panics");

        assert_eq!(summary.admitted, 3);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.state, CrawlState::Terminated);
        // The panicking task produced no result; the other two did
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(LinkCheckResult::is_ok));
    }

    #[tokio::test]
    async fn test_crawl_terminates_after_every_task_completes() {
        let site = FakeSite::default()
            .page(
                "http://site.test/",
                r#"<a href="/a">a</a><a href="/a">a again</a><a href="https://other.test/">ext</a>"#,
            )
            .page("http://site.test/a", r#"<a href="/">home</a><a href="https://other.test/">ext</a>"#);

        let (_, summary, _) = crawl(site, 2).await;

        assert_eq!(summary.state, CrawlState::Terminated);
        assert_eq!(summary.admitted, 3);
        // One Finished per admitted task, none after the count hit zero
        assert_eq!(summary.completed, summary.admitted);
    }

    #[tokio::test]
    async fn test_oversized_parallelism_is_clamped() {
        let site = FakeSite::default().page("http://site.test/", "<p>alone</p>");

        let (_, summary, results) = crawl(site, usize::MAX).await;

        assert_eq!(summary.state, CrawlState::Terminated);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    // Writer that keeps everything the subscriber prints
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_is_logged_at_warn() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        // current-thread runtime: spawned tasks log on this thread too
        let _guard = tracing::subscriber::set_default(subscriber);

        let site = FakeSite::default()
            .page("http://site.test/", r#"<a href="https://other.test/gone">gone</a>"#)
            .status("https://other.test/gone", 404);
        let (_, summary, _) = crawl(site, 8).await;
        assert_eq!(summary.failed, 1);

        let printed = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(printed.contains("WARN"), "logs: {printed}");
        assert!(printed.contains("link check failed"), "logs: {printed}");
        assert!(printed.contains("https://other.test/gone"), "logs: {printed}");
    }
}
