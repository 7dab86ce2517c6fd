//! Integration tests for the reqwest fetcher against a mock HTTP server.

use quire::app::QuireError;
use quire::config::SourceConfig;
use quire::fetcher::http_fetcher::HttpFetcher;
use quire::fetcher::Fetcher;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer) -> HttpFetcher {
    let config = SourceConfig {
        base_url: server.uri(),
        ..SourceConfig::default()
    };
    HttpFetcher::new(&config).expect("client should build")
}

#[tokio::test]
async fn test_fetch_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/list.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "a1" }])))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/data/list.json", server.uri());
    let body = fetcher(&server).fetch_json(&url).await.unwrap();

    assert_eq!(body, json!([{ "id": "a1" }]));
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/articles/gone.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/data/articles/gone.json", server.uri());
    let err = fetcher(&server).fetch_json(&url).await.unwrap_err();

    match err {
        QuireError::Status { url: failed, status } => {
            assert_eq!(failed, url);
            assert_eq!(status.as_u16(), 404);
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/media/a1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let url = format!("{}/data/media/a1.json", server.uri());
    let err = fetcher(&server).fetch_json(&url).await.unwrap_err();

    assert!(matches!(err, QuireError::Decode { .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_unreachable_host_is_an_http_error() {
    let fetcher = HttpFetcher::new(&SourceConfig::default()).unwrap();

    let err = fetcher
        .fetch_json("http://127.0.0.1:9/data/list.json")
        .await
        .unwrap_err();
    assert!(matches!(err, QuireError::Http { .. }));
}
