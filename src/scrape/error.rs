//! Error type for page extraction.

use thiserror::Error;

/// Errors raised when an expected HTML region is absent or unusable.
///
/// The site has no stable API; every extractor works off tag/class
/// lookups. When one fails, the page layout has changed and the only
/// honest report is which page and which region broke.
#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    /// An expected element or attribute was not found on the page.
    #[error("{page} page is missing the {region} region (site layout changed?)")]
    MissingRegion {
        /// Which page was being scraped.
        page: &'static str,
        /// The element/attribute that was expected.
        region: &'static str,
    },

    /// An element was found but its content could not be interpreted.
    #[error("{page} page has a malformed {region}: '{value}'")]
    Malformed {
        /// Which page was being scraped.
        page: &'static str,
        /// The element/attribute that was malformed.
        region: &'static str,
        /// The offending content.
        value: String,
    },
}

impl ScrapeError {
    /// Creates a `MissingRegion` error.
    #[must_use]
    pub fn missing(page: &'static str, region: &'static str) -> Self {
        Self::MissingRegion { page, region }
    }

    /// Creates a `Malformed` error.
    #[must_use]
    pub fn malformed(page: &'static str, region: &'static str, value: impl Into<String>) -> Self {
        Self::Malformed {
            page,
            region,
            value: value.into(),
        }
    }
}
