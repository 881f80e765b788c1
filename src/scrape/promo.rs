//! Promotion-page and book-page extraction.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{ScrapeError, element_text, selector};

static CLAIM_LINK: LazyLock<Selector> = LazyLock::new(|| selector(".twelve-days-claim"));
static PROMO_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("div.dotd-title h2"));
static FEATURED_BOOK_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector("div.dotd-main-book-image a"));
static BOOK_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector("div.book-top-block-info-one-liner"));
static BOOK_AUTHORS: LazyLock<Selector> =
    LazyLock::new(|| selector("div.book-top-block-info-authors"));
static BOOK_PUBLISHED: LazyLock<Selector> = LazyLock::new(|| selector("time"));
static BOOK_CODE_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector("div.book-top-block-code a"));

/// The claimable daily offer as scraped from the promotion page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoPage {
    /// Site-relative path of the claim link.
    pub claim_path: String,
    /// Raw (un-normalized) title of the featured book.
    pub title: String,
}

/// Extended metadata scraped from a book's detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    /// One-line description.
    pub description: String,
    /// Primary author line.
    pub author: String,
    /// Publication date as displayed on the page.
    pub published: String,
    /// Site-relative path of the companion source-code archive.
    pub code_path: String,
}

/// Extracts the claim link and featured title from the promotion page.
///
/// # Errors
///
/// Returns `ScrapeError` when the claim link or the title block is
/// absent (promotion not live, or the page layout changed).
pub fn promo_page(html: &str) -> Result<PromoPage, ScrapeError> {
    let document = Html::parse_document(html);

    let claim_path = document
        .select(&CLAIM_LINK)
        .find_map(|link| link.value().attr("href"))
        .map(ToString::to_string)
        .ok_or_else(|| ScrapeError::missing("promotion", "claim link"))?;

    let title_heading = document
        .select(&PROMO_TITLE)
        .next()
        .ok_or_else(|| ScrapeError::missing("promotion", "title heading"))?;

    Ok(PromoPage {
        claim_path,
        title: element_text(&title_heading),
    })
}

/// Extracts the featured book's detail-page path from the promotion page.
///
/// # Errors
///
/// Returns `ScrapeError` when the featured-book image link is absent.
pub fn featured_book_path(html: &str) -> Result<String, ScrapeError> {
    let document = Html::parse_document(html);
    document
        .select(&FEATURED_BOOK_LINK)
        .find_map(|link| link.value().attr("href"))
        .map(ToString::to_string)
        .ok_or_else(|| ScrapeError::missing("promotion", "featured book link"))
}

/// Extracts description, author, publish date, and code-archive path
/// from a book's detail page.
///
/// # Errors
///
/// Returns `ScrapeError` naming the first region that is absent.
pub fn book_page(html: &str) -> Result<BookPage, ScrapeError> {
    let document = Html::parse_document(html);

    let description = document
        .select(&BOOK_DESCRIPTION)
        .next()
        .map(|el| element_text(&el))
        .ok_or_else(|| ScrapeError::missing("book", "description block"))?;

    // Author block may carry extra lines (credentials, co-authors); only
    // the first line is the author field.
    let author = document
        .select(&BOOK_AUTHORS)
        .next()
        .map(|el| element_text(&el))
        .and_then(|text| text.lines().next().map(|line| line.trim().to_string()))
        .filter(|line| !line.is_empty())
        .ok_or_else(|| ScrapeError::missing("book", "authors block"))?;

    let published = document
        .select(&BOOK_PUBLISHED)
        .next()
        .map(|el| element_text(&el))
        .ok_or_else(|| ScrapeError::missing("book", "publication date"))?;

    let code_path = document
        .select(&BOOK_CODE_LINK)
        .find_map(|link| link.value().attr("href"))
        .map(ToString::to_string)
        .ok_or_else(|| ScrapeError::missing("book", "code download link"))?;

    Ok(BookPage {
        description,
        author,
        published,
        code_path,
    })
}
