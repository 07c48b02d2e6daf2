// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Turn the URL argument into the seed URL
// 3. Start the reporter task, then crawl
// 4. Exit with proper code (0 = crawl ran, 1 = bad arguments or seed URL)
//
// Broken links do NOT change the exit code: they are the crawl's output,
// not a failure of the program.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use checklinks::checker::HttpGateway;
use checklinks::crawl::crawl_website;
use checklinks::report::Reporter;
use clap::error::ErrorKind;
use clap::Parser;
use cli::Cli;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(0);
        }
        Err(e) => {
            // clap's own message already includes the usage line
            e.print()?;
            return Ok(1);
        }
    };

    init_tracing(cli.verbose);

    let address = cli.seed_address();
    let seed = match Url::parse(&address) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("parse {} as URL: {}", address, e);
            return Ok(1);
        }
    };

    let config = cli.crawl_config();
    let gateway = HttpGateway::new(&config)?;

    // Results flow crawler -> channel -> reporter, which prints them as
    // they arrive instead of waiting for the whole crawl
    let (results_tx, results_rx) = mpsc::unbounded_channel();
    let reporter = Reporter::new(std::io::stdout(), cli.visibility(), cli.format());
    let printer = tokio::spawn(reporter.run(results_rx));

    crawl_website(seed, gateway, &config, results_tx).await;

    printer.await.context("Reporter task failed")??;
    Ok(0)
}

// Logs go to stderr so stdout only carries results
//
// RUST_LOG wins if set; otherwise --verbose switches from warnings to debug.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "checklinks=debug"
    } else {
        "checklinks=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
