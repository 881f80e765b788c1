//! Daily free-ebook claiming and metadata capture.

use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::scrape::{self, ScrapeError};
use crate::session::HttpSession;
use crate::title::normalize_title;

/// Marker present in the post-claim response only when the claim landed
/// (the page renders the logged-in account navigation).
const CLAIM_SUCCESS_MARKER: &str = "My eBooks";

/// Timestamp format stamped into metadata log records.
const CAPTURED_AT_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Errors that can occur while claiming the daily ebook or capturing
/// its metadata.
///
/// These are fatal to the operation but do not corrupt the session;
/// other actions may still run.
#[derive(Debug, Error)]
pub enum GrabError {
    /// Network-level failure.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL being requested.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The promotion page returned a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned the error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The claim did not land: non-success status or the post-claim
    /// marker is absent (promotion not live, or already claimed).
    #[error("'{title}' was not claimed - does this promotion exist yet?")]
    NotClaimed {
        /// Normalized title of the book that was being claimed.
        title: String,
    },

    /// An expected HTML region was absent.
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    /// Appending to the metadata log file failed.
    #[error("cannot append to metadata log {path}: {source}")]
    InfoLog {
        /// The metadata log path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl GrabError {
    fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    fn info_log(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InfoLog {
            path: path.into(),
            source,
        }
    }
}

/// A claimed book plus the metadata scraped from its detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimResult {
    /// Normalized title of the claimed book.
    pub title: String,
    /// One-line description from the detail page.
    pub description: String,
    /// Primary author line.
    pub author: String,
    /// Publication date as displayed.
    pub published: String,
    /// Absolute URL of the companion source-code archive.
    pub code_url: String,
    /// Local capture timestamp (`%d-%m-%Y %H:%M`).
    pub captured_at: String,
}

/// Claims the currently featured free ebook on the account.
pub struct BookGrabber<'a> {
    session: &'a HttpSession,
}

impl<'a> BookGrabber<'a> {
    /// Creates a grabber over an authenticated session.
    #[must_use]
    pub fn new(session: &'a HttpSession) -> Self {
        Self { session }
    }

    /// Claims the daily free ebook and returns its normalized title.
    ///
    /// When `log_metadata` is set, the detail page is scraped afterwards
    /// and a record is appended to the metadata log file.
    ///
    /// # Errors
    ///
    /// Returns `GrabError` when the promotion page cannot be fetched or
    /// parsed, or when the claim response does not carry the post-claim
    /// marker (promotion not live, or already claimed).
    pub async fn grab(&self, log_metadata: bool) -> Result<String, GrabError> {
        let config = self.session.config();
        info!("start grabbing ebook");

        let promo_url = config.promo_url();
        let response = self
            .session
            .fetch_page(&promo_url)
            .await
            .map_err(|e| GrabError::network(&promo_url, e))?;
        if !response.status().is_success() {
            return Err(GrabError::http_status(
                &promo_url,
                response.status().as_u16(),
            ));
        }
        let html = response
            .text()
            .await
            .map_err(|e| GrabError::network(&promo_url, e))?;

        let promo = scrape::promo_page(&html)?;
        let title = normalize_title(&promo.title);
        let claim_url = config.absolute_url(&promo.claim_path);
        debug!(%title, url = %claim_url, "following claim link");

        let claim_response = self
            .session
            .fetch_page(&claim_url)
            .await
            .map_err(|e| GrabError::network(&claim_url, e))?;
        let claim_status = claim_response.status();
        let claim_body = claim_response
            .text()
            .await
            .map_err(|e| GrabError::network(&claim_url, e))?;

        if !claim_status.is_success() || !claim_body.contains(CLAIM_SUCCESS_MARKER) {
            return Err(GrabError::NotClaimed { title });
        }
        info!(%title, "ebook claimed successfully");

        if log_metadata {
            self.fetch_metadata().await?;
        }
        Ok(title)
    }

    /// Scrapes the featured book's detail page and appends a record to
    /// the metadata log file.
    ///
    /// # Errors
    ///
    /// Returns `GrabError` when a page cannot be fetched, an expected
    /// HTML region is absent, or the log append fails.
    pub async fn fetch_metadata(&self) -> Result<ClaimResult, GrabError> {
        let config = self.session.config();
        let promo_url = config.promo_url();
        let promo_html = self.fetch_text(&promo_url).await?;

        let promo = scrape::promo_page(&promo_html)?;
        let title = normalize_title(&promo.title);
        info!(%title, "retrieving book metadata");

        let book_url = config.absolute_url(&scrape::featured_book_path(&promo_html)?);
        let book_html = self.fetch_text(&book_url).await?;
        let book = scrape::book_page(&book_html)?;

        let result = ClaimResult {
            title,
            description: book.description,
            author: book.author,
            published: book.published,
            code_url: config.absolute_url(&book.code_path),
            captured_at: Local::now().format(CAPTURED_AT_FORMAT).to_string(),
        };

        append_info_record(&config.info_log_path, &result).await?;
        info!(title = %result.title, "metadata record saved");
        Ok(result)
    }

    async fn fetch_text(&self, url: &str) -> Result<String, GrabError> {
        let response = self
            .session
            .fetch_page(url)
            .await
            .map_err(|e| GrabError::network(url, e))?;
        response
            .text()
            .await
            .map_err(|e| GrabError::network(url, e))
    }
}

/// Renders one metadata record in the log's `KEY --> value` format.
#[must_use]
pub fn format_info_record(result: &ClaimResult) -> String {
    let mut record = String::from("\n");
    for (key, value) in [
        ("TITLE", &result.title),
        ("DESCRIPTION", &result.description),
        ("AUTHOR", &result.author),
        ("DATE_PUBLISHED", &result.published),
        ("CODE_FILES_URL", &result.code_url),
        ("DOWNLOADED_AT", &result.captured_at),
    ] {
        record.push_str(key);
        record.push_str(" --> ");
        record.push_str(value);
        record.push('\n');
    }
    record
}

async fn append_info_record(path: &Path, result: &ClaimResult) -> Result<(), GrabError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| GrabError::info_log(path, e))?;
    file.write_all(format_info_record(result).as_bytes())
        .await
        .map_err(|e| GrabError::info_log(path, e))?;
    file.flush().await.map_err(|e| GrabError::info_log(path, e))
}
