//! Login-page extraction: the hidden anti-forgery token.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{ScrapeError, selector};

static FORM_BUILD_ID: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"#packt-user-login-form input[name="form_build_id"]"#));

/// Extracts the hidden `form_build_id` value from the login form.
///
/// The site's login form carries a per-request anti-forgery token in a
/// hidden input field; the credential POST is rejected without it.
///
/// # Errors
///
/// Returns `ScrapeError` when the login form or its hidden input is
/// absent from the page.
pub fn login_form_build_id(html: &str) -> Result<String, ScrapeError> {
    let document = Html::parse_document(html);
    document
        .select(&FORM_BUILD_ID)
        .find_map(|input| input.value().attr("value"))
        .map(ToString::to_string)
        .ok_or_else(|| ScrapeError::missing("login", "form_build_id input"))
}
