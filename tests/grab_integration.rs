//! Integration tests for the daily free-ebook claim flow.

use packtgrab_core::{BookGrabber, GrabError, HttpSession, ScrapeError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;

use support::{ACCOUNT_SHELL_HTML, mount_login, test_config};

const PROMO_HTML: &str = r#"
    <html><body>
      <div class="dotd-main-book-image">
        <a href="/books/deep-learning"><img src="/covers/dl.png" /></a>
      </div>
      <div class="dotd-title"><h2> Deep Learning </h2></div>
      <a class="twelve-days-claim" href="/freelearning-claim/100/200">Claim</a>
    </body></html>
"#;

const BOOK_HTML: &str = r#"
    <html><body>
      <div class="book-top-block-info-one-liner">Grasp the fundamentals of deep learning.</div>
      <div class="book-top-block-info-authors">Jane Doe</div>
      <time>February 2016</time>
      <div class="book-top-block-code"><a href="/code_download/20892">Code</a></div>
    </body></html>
"#;

async fn mount_promo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/packt/offers/free-learning"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROMO_HTML))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_grab_claims_featured_book_and_returns_normalized_title() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    mount_login(&server, ACCOUNT_SHELL_HTML).await;
    mount_promo(&server).await;

    // The claim response renders the logged-in navigation.
    Mock::given(method("GET"))
        .and(path("/freelearning-claim/100/200"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<nav>My eBooks</nav> claimed!"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), temp_dir.path());
    let session = HttpSession::create(config).await.expect("login works");

    let grabber = BookGrabber::new(&session);
    let title = grabber.grab(false).await.expect("grab succeeds");
    assert_eq!(title, "Deep_Learning");
}

#[tokio::test]
async fn test_grab_without_post_claim_marker_is_not_claimed() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    mount_login(&server, ACCOUNT_SHELL_HTML).await;
    mount_promo(&server).await;

    // Claim responds 200 but without the marker: promotion not live,
    // or the book was already claimed.
    Mock::given(method("GET"))
        .and(path("/freelearning-claim/100/200"))
        .respond_with(ResponseTemplate::new(200).set_body_string("nothing to claim today"))
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), temp_dir.path());
    let session = HttpSession::create(config).await.expect("login works");

    let result = BookGrabber::new(&session).grab(false).await;
    match result {
        Err(GrabError::NotClaimed { title }) => assert_eq!(title, "Deep_Learning"),
        other => panic!("expected NotClaimed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_grab_promo_page_http_error_is_fatal() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    mount_login(&server, ACCOUNT_SHELL_HTML).await;

    Mock::given(method("GET"))
        .and(path("/packt/offers/free-learning"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), temp_dir.path());
    let session = HttpSession::create(config).await.expect("login works");

    let result = BookGrabber::new(&session).grab(false).await;
    match result {
        Err(GrabError::HttpStatus { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected HttpStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_grab_promo_page_without_claim_link_is_scrape_error() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    mount_login(&server, ACCOUNT_SHELL_HTML).await;

    Mock::given(method("GET"))
        .and(path("/packt/offers/free-learning"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>redesigned</body></html>"),
        )
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), temp_dir.path());
    let session = HttpSession::create(config).await.expect("login works");

    let result = BookGrabber::new(&session).grab(false).await;
    assert!(matches!(
        result,
        Err(GrabError::Scrape(ScrapeError::MissingRegion { .. }))
    ));
}

#[tokio::test]
async fn test_fetch_metadata_scrapes_book_page_and_appends_log_record() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    mount_login(&server, ACCOUNT_SHELL_HTML).await;
    mount_promo(&server).await;

    Mock::given(method("GET"))
        .and(path("/books/deep-learning"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BOOK_HTML))
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), temp_dir.path());
    let info_log_path = config.info_log_path.clone();
    let server_uri = server.uri();
    let session = HttpSession::create(config).await.expect("login works");

    let result = BookGrabber::new(&session)
        .fetch_metadata()
        .await
        .expect("metadata scrape succeeds");

    assert_eq!(result.title, "Deep_Learning");
    assert_eq!(result.description, "Grasp the fundamentals of deep learning.");
    assert_eq!(result.author, "Jane Doe");
    assert_eq!(result.published, "February 2016");
    assert_eq!(result.code_url, format!("{server_uri}/code_download/20892"));

    let log = std::fs::read_to_string(&info_log_path).expect("log file written");
    assert!(log.contains("TITLE --> Deep_Learning"), "log: {log}");
    assert!(log.contains("AUTHOR --> Jane Doe"), "log: {log}");
    assert!(log.contains("DOWNLOADED_AT --> "), "log: {log}");
}

#[tokio::test]
async fn test_grab_with_metadata_logging_hits_book_page() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    mount_login(&server, ACCOUNT_SHELL_HTML).await;
    mount_promo(&server).await;

    Mock::given(method("GET"))
        .and(path("/freelearning-claim/100/200"))
        .respond_with(ResponseTemplate::new(200).set_body_string("My eBooks"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/books/deep-learning"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BOOK_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), temp_dir.path());
    let info_log_path = config.info_log_path.clone();
    let session = HttpSession::create(config).await.expect("login works");

    BookGrabber::new(&session)
        .grab(true)
        .await
        .expect("grab with metadata succeeds");

    assert!(info_log_path.is_file(), "metadata log was written");
}
