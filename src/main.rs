//! CLI entry point for the packtgrab tool.

use anyhow::{Context, Result, bail};
use clap::Parser;
use packtgrab_core::{AccountConfig, BookDownloader, BookGrabber, HttpSession};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    if !args.wants_grab() && !args.wants_download() {
        info!("No action requested. Pass --grab, --grab-log, --grab-download,");
        info!("--download-all or --download-chosen. See --help for details.");
        return Ok(());
    }

    // Configuration errors are fatal before any network I/O happens.
    let config = AccountConfig::load(&args.config)
        .with_context(|| format!("cannot load configuration from '{}'", args.config.display()))?;

    let session = HttpSession::create(config)
        .await
        .context("login failed")?;

    let claimed_title = if args.wants_grab() {
        let grabber = BookGrabber::new(&session);
        Some(grabber.grab(args.grab_log).await?)
    } else {
        None
    };

    if args.wants_download() {
        let downloader = BookDownloader::new(&session);
        let books = downloader.list_owned_books().await?;

        // --grab-download restricts the run to the freshly claimed title;
        // --download-chosen uses the titles from the config file.
        let chosen: Option<Vec<String>> = if args.grab_download {
            claimed_title.clone().map(|title| vec![title])
        } else if args.download_chosen {
            match session.config().titles.clone() {
                Some(titles) => Some(titles),
                None => bail!("--download-chosen requires `titles` in the config file"),
            }
        } else {
            None
        };

        let count = downloader
            .download(&books, chosen.as_deref(), None, args.into_folder)
            .await;
        info!(count, "ebooks downloaded");
    }

    info!("Good, looks like all went well!");
    Ok(())
}
