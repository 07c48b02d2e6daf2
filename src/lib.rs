//! checklinks - crawl a website and report the status of every link on it
//!
//! - [`crawl`] - the concurrent crawler: link classification, the
//!   dispatcher, and the per-link tasks
//! - [`checker`] - HTTP fetching and HTML attribute extraction
//! - [`report`] - check results and how they are printed
//! - [`config`] - per-run settings
//! - [`error`] - per-link error type
//!
//! # Example
//!
//! ```no_run
//! use checklinks::checker::HttpGateway;
//! use checklinks::config::CrawlConfig;
//! use checklinks::crawl::crawl_website;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CrawlConfig::default();
//!     let gateway = HttpGateway::new(&config)?;
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!     let printer = tokio::spawn(async move {
//!         while let Some(result) = rx.recv().await {
//!             println!("{}", result);
//!         }
//!     });
//!     let seed = url::Url::parse("https://example.com/")?;
//!     crawl_website(seed, gateway, &config, tx).await;
//!     printer.await?;
//!     Ok(())
//! }
//! ```

pub mod checker;
pub mod config;
pub mod crawl;
pub mod error;
pub mod report;
