//! Authenticated HTTP session against the publisher site.
//!
//! The site has no API token scheme; authentication is a plain form
//! login. The session holds one cookie-bearing [`reqwest::Client`],
//! created once and shared by reference with every other component.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{AccountConfig, REQUEST_USER_AGENT};
use crate::scrape::{self, ScrapeError};

/// Timeout for page requests (login, promotion, account listing).
pub const PAGE_TIMEOUT_SECS: u64 = 10;

/// Marker present on the account page only when the visitor is not
/// logged in (the page falls back to the registration form).
const REGISTER_FORM_MARKER: &str = "register-page-form";

/// Form field values expected by the site's login endpoint.
const LOGIN_OP: &str = "Login";
const LOGIN_FORM_ID: &str = "packt_user_login_form";

/// Errors that can occur while establishing the authenticated session.
///
/// All variants are fatal; a failed login never yields a usable session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Network-level failure (DNS, connection refused, TLS, timeout).
    #[error("network error during login at {url}: {source}")]
    Network {
        /// The URL being requested when the failure occurred.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The login form could not be scraped.
    #[error("cannot prepare login: {source}")]
    LoginForm {
        /// The scrape failure on the login page.
        #[from]
        source: ScrapeError,
    },

    /// The credential POST was rejected outright.
    #[error("login submission rejected with HTTP {status}")]
    LoginRejected {
        /// The HTTP status of the rejected POST.
        status: u16,
    },

    /// The POST looked fine but the account page still shows the
    /// registration form: wrong credentials, or the site changed.
    #[error("login failed: account page still shows the registration form")]
    NotAuthenticated,
}

impl AuthError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }
}

/// One authenticated session: configuration plus a cookie-bearing client.
///
/// Constructed only through [`HttpSession::create`], which performs the
/// full login flow; an `HttpSession` that exists is logged in. The
/// session is read-only after creation and is not persisted across runs.
#[derive(Debug)]
pub struct HttpSession {
    config: AccountConfig,
    client: Client,
}

impl HttpSession {
    /// Logs into the site and returns the authenticated session.
    ///
    /// The flow is: GET the login page and scrape the hidden
    /// anti-forgery token, POST the credential form, then verify by
    /// fetching the account page and checking that it no longer shows
    /// the registration form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` when any login-flow request fails, when the
    /// login form cannot be scraped, when the POST is rejected, or when
    /// verification shows the session is not authenticated.
    pub async fn create(config: AccountConfig) -> Result<Self, AuthError> {
        let client = build_client();
        let login_url = config.login_url();

        info!("creating session");
        debug!(url = %login_url, "fetching login form");
        let login_page = get_page(&client, &login_url).await?;
        let form_build_id = scrape::login_form_build_id(&login_page)?;

        let form = [
            ("email", config.email.as_str()),
            ("password", config.password.as_str()),
            ("op", LOGIN_OP),
            ("form_build_id", form_build_id.as_str()),
            ("form_id", LOGIN_FORM_ID),
        ];
        debug!(url = %login_url, "submitting credentials");
        let post_response = client
            .post(&login_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::network(&login_url, e))?;
        let post_status = post_response.status();

        // Check once more that we are really logged into the server.
        let my_books_url = config.my_books_url();
        let verification = get_page(&client, &my_books_url).await?;

        if !post_status.is_success() {
            return Err(AuthError::LoginRejected {
                status: post_status.as_u16(),
            });
        }
        if verification.contains(REGISTER_FORM_MARKER) {
            return Err(AuthError::NotAuthenticated);
        }

        info!("session created, logged in successfully");
        Ok(Self { config, client })
    }

    /// Returns the account configuration this session was created with.
    #[must_use]
    pub fn config(&self) -> &AccountConfig {
        &self.config
    }

    /// Returns the cookie-bearing HTTP client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches a page through the session with the page timeout applied.
    ///
    /// # Errors
    ///
    /// Returns the underlying `reqwest::Error` on network failure; the
    /// caller maps it into its own error taxonomy.
    pub async fn fetch_page(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .get(url)
            .timeout(Duration::from_secs(PAGE_TIMEOUT_SECS))
            .send()
            .await
    }
}

async fn get_page(client: &Client, url: &str) -> Result<String, AuthError> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(PAGE_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|e| AuthError::network(url, e))?;
    response.text().await.map_err(|e| AuthError::network(url, e))
}

/// Builds the session client: cookie store enabled, fixed User-Agent,
/// `Connection: keep-alive` on every request.
///
/// # Panics
///
/// Panics if the HTTP client builder fails to build with the static
/// configuration. This should never happen in practice.
#[allow(clippy::expect_used)]
fn build_client() -> Client {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    Client::builder()
        .cookie_store(true)
        .user_agent(REQUEST_USER_AGENT)
        .default_headers(headers)
        .gzip(true)
        .build()
        .expect("failed to build HTTP client with static configuration")
}
