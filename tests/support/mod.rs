//! Shared fixtures for the integration suites: a mock site and a
//! config pointed at it.

// Each integration suite compiles this module separately and uses a
// different subset of the fixtures.
#![allow(dead_code)]

use std::path::Path;

use packtgrab_core::AccountConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Login page carrying the hidden anti-forgery token.
pub const LOGIN_FORM_HTML: &str = r#"
    <html><body>
      <form id="packt-user-login-form">
        <input type="text" name="email" />
        <input type="password" name="password" />
        <input type="hidden" name="form_build_id" value="form-Integration123" />
      </form>
    </body></html>
"#;

/// The token value embedded in [`LOGIN_FORM_HTML`].
pub const FORM_BUILD_ID: &str = "form-Integration123";

/// Account page shell for a logged-in user: carries the "My eBooks"
/// navigation and no registration form.
pub const ACCOUNT_SHELL_HTML: &str = r#"
    <html><body>
      <nav><a href="/account/my-ebooks">My eBooks</a></nav>
      <div id="product-account-list"></div>
    </body></html>
"#;

/// Account page shown to anonymous visitors (login failed).
pub const ANONYMOUS_ACCOUNT_HTML: &str = r#"
    <html><body>
      <form class="register-page-form" id="register-page-form">Register</form>
    </body></html>
"#;

/// Builds an [`AccountConfig`] pointed at the mock server, downloading
/// into `download_dir`.
pub fn test_config(server_uri: &str, download_dir: &Path) -> AccountConfig {
    let text = format!(
        r#"
        email = "user@example.com"
        password = "hunter2"
        base_url = "{server_uri}"
        download_dir = "{}"
        info_log = "{}"
        "#,
        download_dir.display(),
        download_dir.join("info.log").display(),
    );
    AccountConfig::parse(&text).expect("test config is valid")
}

/// Mounts a working login flow: form GET, credential POST, and the
/// logged-in account page (`account_html`) used for verification and
/// listing.
pub async fn mount_login(server: &MockServer, account_html: &str) {
    Mock::given(method("GET"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_FORM_HTML))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/account/my-ebooks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(account_html.to_string()))
        .mount(server)
        .await;
}
