//! Account-page extraction: the list of owned ebooks.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::{ScrapeError, selector};

static PRODUCT_LIST: LazyLock<Selector> = LazyLock::new(|| selector("#product-account-list"));
static PRODUCT_ROW: LazyLock<Selector> = LazyLock::new(|| selector("div.product-line.unseen"));
static BUTTON_ROW: LazyLock<Selector> =
    LazyLock::new(|| selector("div.product-buttons-line.toggle"));
static BUTTON_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));

/// Bracketed media suffix appended to owned titles, e.g. `[eBook]`.
#[allow(clippy::expect_used)]
static TITLE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\[e\w+\]\s*").expect("title suffix regex is valid") // Static pattern, safe to panic
});

/// Download-button href: `/<kind>_download/<id>` with an optional
/// trailing `/<format>` segment.
#[allow(clippy::expect_used)]
static DOWNLOAD_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(/[a-zA-Z]+_download/(\w+)(/(\w+))*)").expect("download href regex is valid") // Static pattern, safe to panic
});

/// Map key under which a format-less download button (the companion
/// source-code archive) is stored.
pub const CODE_FORMAT: &str = "code";

/// One owned ebook as scraped from the account page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    /// Raw title with the bracketed `[eBook]`-style suffix stripped.
    pub title: String,
    /// The site's numeric product identifier.
    pub id: u64,
    /// Format name → site-relative download path.
    pub downloads: HashMap<String, String>,
}

/// Parses the account page into one [`BookRecord`] per owned ebook,
/// in page order.
///
/// # Errors
///
/// Returns `ScrapeError` when the product list container is absent or a
/// product row lacks its title/id attributes.
pub fn owned_books(html: &str) -> Result<Vec<BookRecord>, ScrapeError> {
    let document = Html::parse_document(html);

    let list = document
        .select(&PRODUCT_LIST)
        .next()
        .ok_or_else(|| ScrapeError::missing("account", "product list"))?;

    let mut records = Vec::new();
    for row in list.select(&PRODUCT_ROW) {
        let raw_title = row
            .value()
            .attr("title")
            .ok_or_else(|| ScrapeError::missing("account", "product title attribute"))?;
        let raw_id = row
            .value()
            .attr("nid")
            .ok_or_else(|| ScrapeError::missing("account", "product id attribute"))?;
        let id = raw_id
            .parse::<u64>()
            .map_err(|_| ScrapeError::malformed("account", "product id", raw_id))?;

        records.push(BookRecord {
            title: TITLE_SUFFIX.replace_all(raw_title, "").trim().to_string(),
            id,
            downloads: HashMap::new(),
        });
    }

    // Button rows follow the product rows in document order, one per book.
    for (record, buttons) in records.iter_mut().zip(document.select(&BUTTON_ROW)) {
        for link in buttons.select(&BUTTON_LINK) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(captures) = DOWNLOAD_HREF.captures(href) else {
                continue;
            };
            let path = captures[1].to_string();
            let format = captures
                .get(4)
                .map_or(CODE_FORMAT, |m| m.as_str())
                .to_string();
            record.downloads.insert(format, path);
        }
    }

    Ok(records)
}
