//! Registry management endpoints, exercised through the full router.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;
use service_gateway::registry::HealthStatus;

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_register_list_unregister_round_trip() {
    let server = gateway(test_config(), vec![]);
    let router = server.router();

    let (status, body) = call(
        &router,
        Method::POST,
        "/services/register",
        Some(json!({"name": "orders", "url": "http://127.0.0.1:9001/"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "orders");
    assert_eq!(body["data"]["base_url"], "http://127.0.0.1:9001");
    assert_eq!(body["data"]["health_url"], "http://127.0.0.1:9001/health");
    assert_eq!(body["data"]["status"], "healthy");

    call(
        &router,
        Method::POST,
        "/services/register",
        Some(json!({"name": "catalog", "url": "http://127.0.0.1:9002", "status": "unknown"})),
    )
    .await;

    let (status, body) = call(&router, Method::GET, "/services", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["orders", "catalog"]);
    assert_eq!(body["data"][1]["status"], "unknown");

    let (status, body) = call(&router, Method::DELETE, "/services/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "orders");

    let (status, body) = call(&router, Method::DELETE, "/services/orders", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "not_found");

    assert_eq!(server.registry().len(), 1);
}

#[tokio::test]
async fn test_reregister_replaces_in_place() {
    let server = gateway(
        test_config(),
        vec![
            descriptor("a", "http://127.0.0.1:9001", HealthStatus::Healthy),
            descriptor("b", "http://127.0.0.1:9002", HealthStatus::Healthy),
        ],
    );
    let router = server.router();

    let (status, body) = call(
        &router,
        Method::POST,
        "/services/register",
        Some(json!({"name": "a", "url": "http://127.0.0.1:9100", "health_url": "http://127.0.0.1:9100/ping"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("updated"));

    let (_, body) = call(&router, Method::GET, "/services", None).await;
    assert_eq!(body["data"][0]["name"], "a");
    assert_eq!(body["data"][0]["base_url"], "http://127.0.0.1:9100");
    assert_eq!(body["data"][0]["health_url"], "http://127.0.0.1:9100/ping");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_registrations_rejected() {
    let server = gateway(test_config(), vec![]);
    let router = server.router();

    let cases = [
        json!({"url": "http://127.0.0.1:9001"}),
        json!({"name": "orders"}),
        json!({"name": "", "url": "http://127.0.0.1:9001"}),
        json!({"name": "orders", "url": "not a url"}),
        json!({"name": "orders", "url": "ftp://127.0.0.1"}),
        json!({"name": "bad/name", "url": "http://127.0.0.1:9001"}),
        json!({"name": "services", "url": "http://127.0.0.1:9001"}),
        json!({"name": "orders", "url": "http://127.0.0.1:9001", "status": "sleepy"}),
    ];

    for case in cases {
        let (status, body) = call(&router, Method::POST, "/services/register", Some(case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case {}", case);
        assert_eq!(body["error"], "malformed_registration");
    }

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/services/register")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(server.registry().is_empty());
}

#[tokio::test]
async fn test_check_service_updates_status() {
    let backend = start_backend(|req| {
        let status = if req.uri == "/health" {
            StatusCode::OK
        } else {
            StatusCode::NOT_FOUND
        };
        axum::response::IntoResponse::into_response(status)
    })
    .await;
    let server = gateway(
        test_config(),
        vec![descriptor("orders", &backend.url(), HealthStatus::Unknown)],
    );
    let router = server.router();

    let (status, body) = call(&router, Method::POST, "/services/orders/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["healthy"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert!(body["data"]["last_check"].is_string());

    let stored = server.registry().get("orders").unwrap();
    assert_eq!(stored.status, HealthStatus::Healthy);
    assert!(stored.last_check.is_some());
    assert_eq!(backend.last().unwrap().uri, "/health");
}

#[tokio::test]
async fn test_check_unknown_service_is_404() {
    let server = gateway(test_config(), vec![]);
    let (status, body) = call(&server.router(), Method::POST, "/services/ghost/health", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_check_all_reports_counts() {
    let up = start_ok_backend().await;
    let down = unused_addr().await;
    let server = gateway(
        test_config(),
        vec![
            descriptor("up", &up.url(), HealthStatus::Unknown),
            descriptor("down", &format!("http://{}", down), HealthStatus::Healthy),
        ],
    );

    let (status, body) = call(&server.router(), Method::POST, "/services/health/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["healthy"], 1);
    assert_eq!(body["data"]["unhealthy"], 1);
    assert_eq!(body["data"]["errors"], 0);
    assert_eq!(body["data"]["results"][0]["name"], "up");
    assert_eq!(body["data"]["results"][0]["outcome"], "healthy");
    assert_eq!(body["data"]["results"][1]["outcome"], "unhealthy");

    assert_eq!(server.registry().get("down").unwrap().status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_gateway_health_and_fallback() {
    let server = gateway(test_config(), vec![]);
    let router = server.router();

    let (status, body) = call(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = call(&router, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_routes_mounted_under_prefix() {
    let backend = start_ok_backend().await;
    let mut config = test_config();
    config.listener.path_prefix = "/api/v1".to_string();
    let server = gateway(
        config,
        vec![descriptor("orders", &backend.url(), HealthStatus::Healthy)],
    );
    let router = server.router();

    let (status, body) = call(&router, Method::GET, "/api/v1/services", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "orders");

    let (status, _) = call(&router, Method::GET, "/api/v1/orders/list?page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.last().unwrap().uri, "/list?page=2");

    let (status, body) = call(&router, Method::GET, "/services", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_auth_gate_when_enabled() {
    let backend = start_ok_backend().await;
    let mut config = test_config();
    config.auth.enabled = true;
    config.auth.bearer_token = "s3cret".to_string();
    let server = gateway(
        config,
        vec![descriptor("orders", &backend.url(), HealthStatus::Healthy)],
    );
    let router = server.router();

    let (status, body) = call(&router, Method::GET, "/services", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = call(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/orders/list")
                .header(header::AUTHORIZATION, "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.last().unwrap().header("authorization"), Some("Bearer s3cret"));
}
