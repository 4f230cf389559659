// ABOUTME: Router-level tests for POST /scrape and GET /health.
// ABOUTME: Drives the axum app with oneshot requests; upstream pages are served by httpmock.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use scrape_relay::{RedditCredentials, Relay};
use scrape_relay_server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> axum::Router {
    let relay = Relay::builder()
        .allow_private_networks(true)
        .build(RedditCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_agent: "relay-server-tests/0.1".to_string(),
        });
    router(AppState::new(relay))
}

fn form_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/scrape")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn encode(url: &str) -> String {
    url::form_urlencoded::byte_serialize(url.as_bytes()).collect()
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn missing_url_is_bad_request() {
    let (status, body) = send(form_request(String::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "URL is required"}));
}

#[tokio::test]
async fn blank_url_is_bad_request() {
    let (status, body) = send(form_request("url=%20%20".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "URL is required"}));
}

#[tokio::test]
async fn non_form_body_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/scrape")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"url":"https://example.com"}"#))
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "URL is required"}));
}

#[tokio::test]
async fn article_is_returned_as_json() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/news");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><head><title>News</title></head><body><article><p>Fresh.</p></article></body></html>");
    });

    let url = server.url("/news");
    let (status, body) = send(form_request(format!("url={}", encode(&url)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"title": "News", "url": url, "content": "Fresh."}));
}

#[tokio::test]
async fn extraction_failure_is_server_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/broken");
        then.status(503);
    });

    let url = server.url("/broken");
    let (status, body) = send(form_request(format!("url={}", encode(&url)))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Error scraping article: HTTP status 503"}));
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}
