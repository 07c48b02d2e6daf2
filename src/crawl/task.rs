// src/crawl/task.rs
// =============================================================================
// The two kinds of work the dispatcher hands out.
//
// - Node task (internal page): GET it, pull out every <a href>, send each
//   crawlable link back to the dispatcher, report the page itself.
// - Leaf task (external link): HEAD it (GET on 405), report the status.
//
// Each task talks to the dispatcher only through one channel of Events.
// A CompletionGuard sends the Finished event when the task ends, however
// it ends - returning early, finishing normally, or panicking.
//
// Rust concepts:
// - Drop: code that runs when a value goes out of scope, even on panic
// - Semaphore permits: RAII tokens that limit concurrent HTTP requests
// =============================================================================

use crate::checker::Gateway;
use crate::crawl::link::{Link, QualifiedLink};
use crate::error::LinkError;
use crate::report::LinkCheckResult;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use url::Url;

// Messages from tasks to the dispatcher
#[derive(Debug)]
pub(crate) enum Event {
    /// A crawlable link found on an internal page
    Discovered(Link),
    /// The outcome for one link
    Checked(LinkCheckResult),
    /// A task has ended; sent exactly once per spawned task
    Finished,
}

// Everything a task needs, shared by all tasks of one crawl
pub(crate) struct TaskContext<G> {
    pub gateway: G,
    pub tokens: Semaphore,
    pub events: UnboundedSender<Event>,
}

impl<G: Gateway> TaskContext<G> {
    // Runs one HTTP call while holding a token from the pool
    //
    // The permit is released as soon as the call returns, so link extraction
    // afterwards doesn't keep a network slot busy.
    async fn with_token<T, F>(&self, url: &Url, call: F) -> Result<T, LinkError>
    where
        F: Future<Output = Result<T, LinkError>>,
    {
        let _permit = self.tokens.acquire().await.map_err(|_| LinkError::Transport {
            method: "ACQUIRE",
            url: url.to_string(),
            reason: "request token pool closed".to_string(),
        })?;
        call.await
    }

    // The receiver lives as long as any task is outstanding, so a failed
    // send only happens when the whole crawl is being torn down
    fn send(&self, event: Event) {
        let _ = self.events.send(event);
    }

    fn report(&self, result: LinkCheckResult) {
        self.send(Event::Checked(result));
    }
}

// Sends Event::Finished when dropped
pub(crate) struct CompletionGuard {
    events: UnboundedSender<Event>,
}

impl CompletionGuard {
    pub fn new(events: UnboundedSender<Event>) -> Self {
        CompletionGuard { events }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let _ = self.events.send(Event::Finished);
    }
}

// Crawls one internal page
pub(crate) async fn process_node<G: Gateway>(ctx: Arc<TaskContext<G>>, link: QualifiedLink) {
    let _done = CompletionGuard::new(ctx.events.clone());

    let fetched = ctx
        .with_token(&link.url, ctx.gateway.fetch_document(&link.url))
        .await;
    let document = match fetched {
        Ok(document) => document,
        Err(error) => {
            tracing::warn!(url = %link.url, %error, "page fetch failed");
            ctx.report(LinkCheckResult::failed(link.url.as_str(), link.source.as_str(), error));
            return;
        }
    };

    let hrefs = document.attribute_values("a", "href");
    tracing::debug!(url = %link.url, links = hrefs.len(), "extracted links");

    for href in hrefs {
        match Link::parse(&href, &link.url) {
            Ok(candidate) if candidate.is_crawlable() => ctx.send(Event::Discovered(candidate)),
            Ok(_) => ctx.report(LinkCheckResult::failed(href, link.url.as_str(), LinkError::NotCrawlable)),
            Err(error) => ctx.report(LinkCheckResult::failed(href, link.url.as_str(), error)),
        }
    }

    ctx.report(LinkCheckResult::ok(link.url.as_str(), link.source.as_str()));
}

// Checks one external link without reading it
pub(crate) async fn process_leaf<G: Gateway>(ctx: Arc<TaskContext<G>>, link: QualifiedLink) {
    let _done = CompletionGuard::new(ctx.events.clone());

    let checked = ctx
        .with_token(&link.url, ctx.gateway.check_link(&link.url))
        .await;
    let result = match checked {
        Ok(check) if check.status.is_success() => {
            LinkCheckResult::ok(link.url.as_str(), link.source.as_str())
        }
        Ok(check) => LinkCheckResult::failed(
            link.url.as_str(),
            link.source.as_str(),
            LinkError::http_status(check.method, check.status, link.url.as_str()),
        ),
        Err(error) => LinkCheckResult::failed(link.url.as_str(), link.source.as_str(), error),
    };

    if let Some(error) = &result.error {
        tracing::warn!(url = %link.url, %error, "link check failed");
    }
    ctx.report(result);
}
