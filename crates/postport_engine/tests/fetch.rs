use std::time::Duration;

use postport_engine::{FailureKind, FetchSettings, ImageFetcher, ReqwestImageFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

async fn serve(route: &str, response: ResponseTemplate) -> (MockServer, String) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(&server)
        .await;
    let url = format!("{}{route}", server.uri());
    (server, url)
}

#[tokio::test]
async fn fetcher_returns_image_bytes() {
    let (_server, url) = serve(
        "/cover.png",
        ResponseTemplate::new(200).set_body_raw(PNG, "image/png"),
    )
    .await;

    let fetcher = ReqwestImageFetcher::new(FetchSettings::default()).unwrap();
    let image = fetcher.fetch(&url).await.expect("fetch ok");

    assert_eq!(image.bytes, PNG);
    assert_eq!(image.final_url, url);
    assert!(image.looks_like_image());
}

#[tokio::test]
async fn non_image_content_type_is_still_returned() {
    let (_server, url) = serve(
        "/page",
        ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"),
    )
    .await;

    let fetcher = ReqwestImageFetcher::new(FetchSettings::default()).unwrap();
    let image = fetcher.fetch(&url).await.unwrap();
    assert!(!image.looks_like_image());
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let (_server, url) = serve("/missing.png", ResponseTemplate::new(404)).await;

    let fetcher = ReqwestImageFetcher::new(FetchSettings::default()).unwrap();
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn empty_body_is_a_failure() {
    let (_server, url) = serve("/empty.png", ResponseTemplate::new(200)).await;

    let fetcher = ReqwestImageFetcher::new(FetchSettings::default()).unwrap();
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::EmptyBody);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let (_server, url) = serve(
        "/slow.png",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(250))
            .set_body_raw(PNG, "image/png"),
    )
    .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestImageFetcher::new(settings).unwrap();
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let (_server, url) = serve(
        "/large.png",
        ResponseTemplate::new(200)
            .insert_header("Content-Type", "image/png")
            .set_body_string("01234567890"),
    )
    .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestImageFetcher::new(settings).unwrap();
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn redirect_loop_hits_the_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop.png"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/loop.png", server.uri())),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        redirect_limit: 2,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestImageFetcher::new(settings).unwrap();
    let err = fetcher
        .fetch(&format!("{}/loop.png", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::RedirectLimitExceeded);
}

#[tokio::test]
async fn invalid_url_is_rejected_before_any_request() {
    let fetcher = ReqwestImageFetcher::new(FetchSettings::default()).unwrap();
    let err = fetcher.fetch("not a url").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
