//! Echo Nest client tests against a local HTTP server

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tagdog::services::EchoNestClient;
use tagdog::{Term, TermSource, TermSourceError};

async fn terms_handler(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if params.get("api_key").map(String::as_str) != Some("test-key") {
        return Json(json!({
            "response": {"status": {"code": 1, "message": "Invalid key"}}
        }));
    }
    if params.get("sort").map(String::as_str) != Some("weight")
        || params.get("format").map(String::as_str) != Some("json")
    {
        return Json(json!({
            "response": {"status": {"code": 4, "message": "Missing parameter"}}
        }));
    }

    match params.get("name").map(String::as_str) {
        Some("Nirvana") => Json(json!({
            "response": {
                "status": {"code": 0, "message": "Success", "version": "4.2"},
                "terms": [
                    {"frequency": 1.0, "name": "grunge", "weight": 0.9},
                    {"frequency": 0.9, "name": "rock", "weight": 0.7},
                    {"frequency": 0.5, "name": "loud", "weight": 0.3}
                ]
            }
        })),
        Some("Guns N' Roses") => Json(json!({
            "response": {
                "status": {"code": 0, "message": "Success"},
                "terms": [{"frequency": 1.0, "name": "hard rock", "weight": 1.0}]
            }
        })),
        _ => Json(json!({
            "response": {
                "status": {"code": 5, "message": "The Identifier specified does not exist"}
            }
        })),
    }
}

async fn broken_handler() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn throttled_handler() -> impl IntoResponse {
    (StatusCode::TOO_MANY_REQUESTS, "slow down")
}

async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route("/api/v4/artist/terms", get(terms_handler))
        .route("/broken/artist/terms", get(broken_handler))
        .route("/throttled/artist/terms", get(throttled_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, prefix: &str, key: &str) -> EchoNestClient {
    EchoNestClient::new(
        key,
        format!("http://{}/{}/", addr, prefix),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_lookup_terms_success() {
    let addr = spawn_server().await;
    let client = client(addr, "api/v4", "test-key");

    let terms = client.lookup_terms("Nirvana").await.unwrap();

    assert_eq!(
        terms,
        vec![
            Term::new("grunge", 0.9),
            Term::new("rock", 0.7),
            Term::new("loud", 0.3),
        ]
    );
}

#[tokio::test]
async fn test_artist_name_is_query_encoded() {
    let addr = spawn_server().await;
    let client = client(addr, "api/v4", "test-key");

    let terms = client.artist_terms("Guns N' Roses").await.unwrap();

    assert_eq!(terms, vec![Term::new("hard rock", 1.0)]);
}

#[tokio::test]
async fn test_unknown_artist_is_api_error() {
    let addr = spawn_server().await;
    let client = client(addr, "api/v4", "test-key");

    match client.lookup_terms("No Such Band").await {
        Err(TermSourceError::ApiError { code, .. }) => assert_eq!(code, 5),
        other => panic!("Expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bad_key_is_api_error() {
    let addr = spawn_server().await;
    let client = client(addr, "api/v4", "wrong-key");

    match client.lookup_terms("Nirvana").await {
        Err(TermSourceError::ApiError { code, message }) => {
            assert_eq!(code, 1);
            assert_eq!(message, "Invalid key");
        }
        other => panic!("Expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_http_error() {
    let addr = spawn_server().await;
    let client = client(addr, "broken", "test-key");

    match client.lookup_terms("Nirvana").await {
        Err(TermSourceError::HttpError(status, body)) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("Expected HttpError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_429_is_rate_limit() {
    let addr = spawn_server().await;
    let client = client(addr, "throttled", "test-key");

    assert!(matches!(
        client.lookup_terms("Nirvana").await,
        Err(TermSourceError::RateLimitExceeded)
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(addr, "api/v4", "test-key");

    assert!(matches!(
        client.lookup_terms("Nirvana").await,
        Err(TermSourceError::NetworkError(_))
    ));
}
