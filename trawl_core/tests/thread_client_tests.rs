use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use trawl_core::retrieval::{format_thread, RedditClient, ThreadClient};
use trawl_core::TrawlError;
use url::Url;

fn client(server: &MockServer) -> RedditClient {
    RedditClient::new("client-id", "client-secret", "trawl-test/1.0", Duration::from_secs(5))
        .unwrap()
        .with_endpoints(
            Url::parse(&server.url("/api/v1/access_token")).unwrap(),
            Url::parse(&server.url("/")).unwrap(),
        )
}

fn thread_body() -> serde_json::Value {
    json!([
        { "kind": "Listing", "data": { "children": [
            { "kind": "t3", "data": {
                "title": "Which async runtime?",
                "score": 128,
                "selftext": "Tokio or something else?"
            } }
        ] } },
        { "kind": "Listing", "data": { "children": [
            { "kind": "t1", "data": { "score": 40, "body": "Tokio.", "replies": "" } },
            { "kind": "t1", "data": { "score": 12, "body": "smol is nice too." } },
            { "kind": "more", "data": { "count": 7, "children": ["c9", "c10"] } }
        ] } }
    ])
}

#[tokio::test]
async fn test_fetch_thread_with_cached_token() {
    let server = MockServer::start_async().await;
    let token = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/access_token")
                .header_exists("authorization")
                .body_contains("grant_type=client_credentials");
            then.status(200).json_body(json!({
                "access_token": "tok-123",
                "token_type": "bearer",
                "expires_in": 86400
            }));
        })
        .await;
    let comments = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/comments/abc123")
                .query_param("raw_json", "1")
                .header("authorization", "Bearer tok-123");
            then.status(200).json_body(thread_body());
        })
        .await;

    let client = client(&server);
    let url = Url::parse("https://www.reddit.com/r/rust/comments/abc123/which_async_runtime/").unwrap();

    let thread = client.fetch_thread(&url).await.unwrap();
    assert_eq!(
        format_thread(&thread),
        "Title: Which async runtime? (Upvotes:128)\nContent: Tokio or something else?\nComments:\n0. (Upvotes:40) Tokio.\n1. (Upvotes:12) smol is nice too.\n"
    );

    let short = Url::parse("https://redd.it/abc123").unwrap();
    client.fetch_thread(&short).await.unwrap();

    token.assert_hits_async(1).await;
    comments.assert_hits_async(2).await;
}

#[tokio::test]
async fn test_rejected_credentials() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/access_token");
            then.status(401).json_body(json!({ "error": 401 }));
        })
        .await;

    let url = Url::parse("https://old.reddit.com/r/rust/comments/abc123").unwrap();
    let err = client(&server).fetch_thread(&url).await.unwrap_err();
    assert!(matches!(err, TrawlError::NotConfigured(_)), "{:?}", err);
}

#[tokio::test]
async fn test_non_thread_url_is_rejected_before_any_request() {
    let server = MockServer::start_async().await;
    let token = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/access_token");
            then.status(200).json_body(json!({ "access_token": "t", "expires_in": 3600 }));
        })
        .await;

    let url = Url::parse("https://www.reddit.com/r/rust/").unwrap();
    let err = client(&server).fetch_thread(&url).await.unwrap_err();
    assert_eq!(err.code_str(), "invalid_input");
    assert_eq!(token.hits_async().await, 0);
}
