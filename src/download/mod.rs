//! Owned-ebook listing and streaming downloads.
//!
//! The downloader enumerates the account page into [`BookRecord`]s and
//! streams selected formats to disk. Downloads are sequential and
//! idempotent: a file that already exists on disk is never re-fetched
//! or overwritten, and a failure on one file never aborts the batch.

pub mod constants;
mod error;
mod progress;

pub use constants::{CODE_ARCHIVE_EXTENSION, DEFAULT_FORMATS, DOWNLOAD_INIT_TIMEOUT_SECS};
pub use error::{DownloadError, FetchError};

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::config::AccountConfig;
use crate::scrape::{self, BookRecord, CODE_FORMAT};
use crate::session::HttpSession;
use crate::title::normalize_title;
use progress::DownloadProgress;

/// Downloads already-claimed ebooks from the account.
pub struct BookDownloader<'a> {
    session: &'a HttpSession,
}

impl<'a> BookDownloader<'a> {
    /// Creates a downloader over an authenticated session.
    #[must_use]
    pub fn new(session: &'a HttpSession) -> Self {
        Self { session }
    }

    /// Fetches the account page and parses every owned ebook, in page
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the page cannot be fetched, returns a
    /// non-success status, or cannot be parsed.
    pub async fn list_owned_books(&self) -> Result<Vec<BookRecord>, FetchError> {
        let url = self.session.config().my_books_url();
        info!("getting data of all your books");

        let response = self
            .session
            .fetch_page(&url)
            .await
            .map_err(|e| FetchError::network(&url, e))?;
        if !response.status().is_success() {
            return Err(FetchError::http_status(&url, response.status().as_u16()));
        }
        let html = response
            .text()
            .await
            .map_err(|e| FetchError::network(&url, e))?;

        let books = scrape::owned_books(&html)?;
        info!(count = books.len(), "account library listed");
        Ok(books)
    }

    /// Downloads the requested formats of the requested titles.
    ///
    /// - `titles`: when given, only books whose normalized title equals
    ///   a normalized requested title are considered; an empty match is
    ///   logged, not an error.
    /// - `formats`: when `None`, falls back to the configured formats,
    ///   then to [`DEFAULT_FORMATS`].
    /// - `into_subfolder`: save each book under a subfolder named by its
    ///   normalized title.
    ///
    /// Files that already exist are skipped and never counted. A
    /// per-file failure is logged and the batch continues.
    ///
    /// Returns the number of newly downloaded files.
    pub async fn download(
        &self,
        books: &[BookRecord],
        titles: Option<&[String]>,
        formats: Option<&[String]>,
        into_subfolder: bool,
    ) -> usize {
        let config = self.session.config();
        let formats = effective_formats(formats, config.formats.as_deref());
        let selected = select_books(books, titles);
        if selected.is_empty() {
            info!(?titles, "no owned books match the requested titles");
            return 0;
        }

        let mut downloaded = 0_usize;
        for book in selected {
            let title = normalize_title(&book.title);
            for format in &formats {
                let Some(relative_path) = book.downloads.get(format) else {
                    continue;
                };
                let target_dir = if into_subfolder {
                    config.download_dir.join(&title)
                } else {
                    config.download_dir.clone()
                };
                let full_path = target_dir.join(file_name_for(&title, format));

                if full_path.is_file() {
                    info!(path = %full_path.display(), "already exists under the given path");
                    continue;
                }

                let url = config.absolute_url(relative_path);
                if format == CODE_FORMAT {
                    info!(%title, "downloading code archive");
                } else {
                    info!(%title, %format, "downloading ebook");
                }
                match self.download_file(&url, &target_dir, &full_path).await {
                    Ok(()) => {
                        downloaded += 1;
                        info!(path = %full_path.display(), "downloaded successfully");
                    }
                    Err(error) => {
                        error!(%error, %title, %format, "download failed");
                    }
                }
            }
        }

        info!(downloaded, "download run finished");
        downloaded
    }

    /// Streams one download URL to `path`, flushing after every chunk.
    async fn download_file(
        &self,
        url: &str,
        target_dir: &Path,
        path: &Path,
    ) -> Result<(), DownloadError> {
        debug!(%url, "initiating download");
        // The timeout covers initiation only; once headers have arrived
        // the body may stream for as long as it needs.
        let response = tokio::time::timeout(
            Duration::from_secs(DOWNLOAD_INIT_TIMEOUT_SECS),
            self.session.client().get(url).send(),
        )
        .await
        .map_err(|_| DownloadError::timeout(url))?
        .map_err(|e| DownloadError::network(url, e))?;

        if !response.status().is_success() {
            return Err(DownloadError::http_status(url, response.status().as_u16()));
        }

        tokio::fs::create_dir_all(target_dir)
            .await
            .map_err(|e| DownloadError::io(target_dir, e))?;

        let progress = DownloadProgress::start(response.content_length());
        let mut file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(path, e))?;
            file.flush().await.map_err(|e| DownloadError::io(path, e))?;
            progress.advance(chunk.len() as u64);
        }

        progress.finish();
        Ok(())
    }
}

/// Resolves the format list: explicit request, then configuration, then
/// the built-in default set.
fn effective_formats(requested: Option<&[String]>, configured: Option<&[String]>) -> Vec<String> {
    requested
        .or(configured)
        .map_or_else(
            || DEFAULT_FORMATS.iter().map(ToString::to_string).collect(),
            <[String]>::to_vec,
        )
}

/// Filters books by normalized-title equality with the requested titles.
/// With no titles, every book is selected.
fn select_books<'b>(books: &'b [BookRecord], titles: Option<&[String]>) -> Vec<&'b BookRecord> {
    match titles {
        None => books.iter().collect(),
        Some(wanted) => {
            let keys: Vec<String> = wanted.iter().map(|t| normalize_title(t)).collect();
            books
                .iter()
                .filter(|book| keys.contains(&normalize_title(&book.title)))
                .collect()
        }
    }
}

/// On-disk filename for a normalized title and format. The code archive
/// saves as `.zip`; every other format uses its own name as extension.
fn file_name_for(normalized_title: &str, format: &str) -> PathBuf {
    let extension = if format == CODE_FORMAT {
        CODE_ARCHIVE_EXTENSION
    } else {
        format
    };
    PathBuf::from(format!("{normalized_title}.{extension}"))
}
