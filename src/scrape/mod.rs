//! Page extractors for the site's HTML.
//!
//! One narrow extractor per page type, each taking raw HTML and
//! returning a typed record or [`ScrapeError`]. This isolates the one
//! genuinely fragile dependency (third-party markup) behind a stable
//! contract that the session, grab, and download modules consume.

pub mod account;
pub mod error;
pub mod login;
pub mod promo;

pub use account::{BookRecord, CODE_FORMAT, owned_books};
pub use error::ScrapeError;
pub use login::login_form_build_id;
pub use promo::{BookPage, PromoPage, book_page, featured_book_path, promo_page};

use scraper::Selector;

/// Compiles a static CSS selector.
///
/// Selectors in this module are compile-time constants, so a parse
/// failure is a programming error rather than a runtime condition.
#[allow(clippy::expect_used)]
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static CSS selector is valid")
}

/// Collects the visible text of an element, whitespace-trimmed.
pub(crate) fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
