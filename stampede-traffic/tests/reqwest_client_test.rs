//! ReqwestClient against a local axum server

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use stampede_config::{Configuration, EndpointSpec};
use stampede_traffic::{ClientConfig, DispatchOutcome, HttpClient, OutboundRequest, ReqwestClient, TrafficPlan};
use std::collections::BTreeMap;
use std::sync::Arc;

async fn start_server() -> String {
    async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let tag = headers
            .get("x-tag")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if body.get("qty").is_some() && tag == "load" {
            (StatusCode::CREATED, Json(body))
        } else {
            (StatusCode::BAD_REQUEST, Json(json!({"tag": tag})))
        }
    }

    async fn item(Path(id): Path<u32>) -> StatusCode {
        if id == 404 {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        }
    }

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/orders", post(echo))
        .route("/items/{id}", delete(item));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client() -> ReqwestClient {
    ReqwestClient::new(&ClientConfig::default()).unwrap()
}

#[tokio::test]
async fn test_get_returns_status() {
    let base = start_server().await;
    let status = client()
        .send(OutboundRequest {
            method: stampede_config::HttpMethod::Get,
            url: format!("{base}/health"),
            headers: BTreeMap::new(),
            body: None,
        })
        .await
        .unwrap();
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_non_success_status_is_not_an_error() {
    let base = start_server().await;
    let status = client()
        .send(OutboundRequest {
            method: stampede_config::HttpMethod::Delete,
            url: format!("{base}/items/404"),
            headers: BTreeMap::new(),
            body: None,
        })
        .await
        .unwrap();
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_simulated_user_posts_json_with_headers() {
    let base = start_server().await;
    let config: Configuration = serde_json::from_value(json!({
        "host": base,
        "users": 1,
        "spawn_rate": 1,
        "run_time": "10s",
        "endpoints": [{
            "path": "/orders",
            "method": "POST",
            "headers": {"X-Tag": "load"},
            "payload": {"qty": 3}
        }]
    }))
    .unwrap();

    let user = TrafficPlan::new(Arc::new(config)).user();
    let outcome = user.run_task(&client()).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Sent {
            method: "POST".into(),
            path: "/orders".into(),
            status: 201
        }
    );
}

#[tokio::test]
async fn test_unreachable_host_is_failed_outcome() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config: Configuration = serde_json::from_value(json!({
        "host": format!("http://{}", addr),
        "users": 1,
        "spawn_rate": 1,
        "run_time": "10s"
    }))
    .unwrap();
    assert_eq!(config.endpoints, vec![EndpointSpec::root()]);

    let user = TrafficPlan::new(Arc::new(config)).user();
    let outcome = user.run_task(&client()).await;
    assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
}
