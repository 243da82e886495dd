//! HTTP surface tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::{ProjectServer, ServerConfig};
use crate::storage::Database;

fn test_server(api_token: Option<&str>) -> ProjectServer {
    let config = ServerConfig {
        port: 0,
        api_token: api_token.map(str::to_string),
        ..ServerConfig::default()
    };
    let db = Database::new_in_memory().unwrap();
    ProjectServer::new(config, Arc::new(Mutex::new(db)))
}

fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn request_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    if bytes.is_empty() {
        return (status, Value::Null);
    }
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn create(router: &Router, name: &str, status: &str) -> i64 {
    let (code, body) = request_json(
        router,
        json_request(
            Method::POST,
            "/projects",
            Some(json!({
                "name": name,
                "start_date": "2024-01-01",
                "end_date": "2024-03-01",
                "status": status
            })),
        ),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED, "create failed: {}", body);
    body["project"]["id"].as_i64().unwrap()
}

fn page_ids(body: &Value) -> Vec<i64> {
    body["projects"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = test_server(Some("secret")).router();
    let (status, body) = request_json(&router, json_request(Method::GET, "/api/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "project-deck");
}

#[tokio::test]
async fn test_create_and_show_project() {
    let router = test_server(None).router();
    let id = create(&router, "Apollo", "In Progress").await;

    let (status, body) =
        request_json(&router, json_request(Method::GET, &format!("/projects/{}", id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["name"], "Apollo");
    assert_eq!(body["project"]["status"], "In Progress");
    assert_eq!(body["project"]["order"], 1);
    assert_eq!(body["project"]["stared"], false);
    assert_eq!(body["project"]["quick_access"], false);
}

#[tokio::test]
async fn test_create_rejects_bad_date_range() {
    let router = test_server(None).router();
    let (status, body) = request_json(
        &router,
        json_request(
            Method::POST,
            "/projects",
            Some(json!({
                "name": "Apollo",
                "start_date": "2024-05-01",
                "end_date": "2024-03-01",
                "status": "Pending"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(
        body["errors"]["end_date"],
        "End date should not be before the start date."
    );
}

#[tokio::test]
async fn test_show_missing_project_is_404() {
    let router = test_server(None).router();
    let (status, body) = request_json(&router, json_request(Method::GET, "/projects/77", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_pagination_and_envelope() {
    let router = test_server(None).router();
    for i in 1..=12 {
        create(&router, &format!("p{}", i), "Pending").await;
    }

    let (status, body) =
        request_json(&router, json_request(Method::GET, "/projects?page=2", None)).await;
    assert_eq!(status, StatusCode::OK);

    let ranks: Vec<i64> = body["projects"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["order"].as_i64().unwrap())
        .collect();
    assert_eq!(ranks, vec![6, 7, 8, 9, 10]);
    assert_eq!(body["projects"]["current_page"], 2);
    assert_eq!(body["projects"]["last_page"], 3);
    assert_eq!(body["projects"]["per_page"], 5);
    assert_eq!(body["projects"]["total"], 12);
}

#[tokio::test]
async fn test_list_search_without_match() {
    let router = test_server(None).router();
    create(&router, "Apollo", "Pending").await;

    let (status, body) = request_json(
        &router,
        json_request(Method::GET, "/projects?page=1&search=zzz", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["projects"]["data"].as_array().unwrap().is_empty());
    assert_eq!(body["projects"]["last_page"], 1);
}

#[tokio::test]
async fn test_update_orders_then_list_reflects_batch() {
    let router = test_server(None).router();
    let a = create(&router, "a", "Pending").await;
    let b = create(&router, "b", "Pending").await;
    let c = create(&router, "c", "Pending").await;

    let (status, body) = request_json(
        &router,
        json_request(
            Method::PUT,
            "/project/update-orders",
            Some(json!({ "projects": [
                { "id": c, "order": 1 },
                { "id": a, "order": 2 },
                { "id": 999, "order": 3 },
                { "id": b, "order": 4 }
            ]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (_, body) = request_json(&router, json_request(Method::GET, "/projects", None)).await;
    assert_eq!(page_ids(&body), vec![c, a, b]);
}

#[tokio::test]
async fn test_update_orders_rejects_negative_rank() {
    let router = test_server(None).router();
    let a = create(&router, "a", "Pending").await;

    let (status, body) = request_json(
        &router,
        json_request(
            Method::PUT,
            "/project/update-orders",
            Some(json!({ "projects": [{ "id": a, "order": -3 }] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["projects"].is_string());
}

#[tokio::test]
async fn test_update_orders_rejects_rank_above_max() {
    let router = test_server(None).router();
    let id = create(&router, "Apollo", "Pending").await;

    let (status, body) = request_json(
        &router,
        json_request(
            Method::PUT,
            "/project/update-orders",
            Some(json!({ "projects": [{ "id": id, "order": i64::MAX }] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_FAILED");

    create(&router, "Gemini", "Pending").await;
    let (status, body) = request_json(&router, json_request(Method::GET, "/projects", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["projects"]["total"], 2);
}

#[tokio::test]
async fn test_non_numeric_id_gets_json_error() {
    let router = test_server(None).router();
    let (status, body) = request_json(
        &router,
        json_request(Method::PUT, "/project/abc/changeFavorite", None),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(body["errors"]["path"].is_string());
}

#[tokio::test]
async fn test_malformed_batch_gets_json_error() {
    let router = test_server(None).router();
    let (status, body) = request_json(
        &router,
        json_request(
            Method::PUT,
            "/project/update-orders",
            Some(json!({ "projects": [{ "id": 1, "order": "x" }] })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(body["errors"]["body"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON data"));
}

#[tokio::test]
async fn test_bad_query_string_gets_json_error() {
    let router = test_server(None).router();
    let (status, body) =
        request_json(&router, json_request(Method::GET, "/projects?page=-1", None)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(body["errors"]["query"].is_string());
}

#[tokio::test]
async fn test_missing_content_type_gets_json_error() {
    let router = test_server(None).router();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/projects")
        .body(Body::from(r#"{"name":"Apollo"}"#))
        .unwrap();
    let (status, body) = request_json(&router, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["body"]
        .as_str()
        .unwrap()
        .starts_with("Missing Content-Type"));
}

#[tokio::test]
async fn test_favorite_toggle_round_trip() {
    let router = test_server(None).router();
    let id = create(&router, "a", "Pending").await;
    let uri = format!("/project/{}/changeFavorite", id);

    let (status, body) = request_json(&router, json_request(Method::PUT, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project added to favorites");

    let (_, body) =
        request_json(&router, json_request(Method::GET, "/project/myFavorites", None)).await;
    assert_eq!(body["favorite"].as_array().unwrap().len(), 1);

    let (_, body) = request_json(&router, json_request(Method::PUT, &uri, None)).await;
    assert_eq!(body["message"], "Project removed from favorites");

    let (_, body) =
        request_json(&router, json_request(Method::GET, "/project/myFavorites", None)).await;
    assert!(body["favorite"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_favorite_missing_project_is_404() {
    let router = test_server(None).router();
    let (status, _) = request_json(
        &router,
        json_request(Method::PUT, "/project/42/changeFavorite", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quick_access_add_twice_and_remove() {
    let router = test_server(None).router();
    let id = create(&router, "a", "Pending").await;
    let add = format!("/project/{}/changeQuickAccess", id);
    let remove = format!("/project/{}/removeQuickAccess", id);

    for _ in 0..2 {
        let (status, _) = request_json(&router, json_request(Method::PUT, &add, None)).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) =
        request_json(&router, json_request(Method::GET, "/project/quickAccess", None)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = request_json(&router, json_request(Method::PUT, &remove, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project removed from quick access");

    // second removal is a no-op, not an error
    let (status, body) = request_json(&router, json_request(Method::PUT, &remove, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project was not in quick access");
}

#[tokio::test]
async fn test_statistics_payload() {
    let router = test_server(None).router();
    let a = create(&router, "a", "Completed").await;
    let b = create(&router, "b", "In Progress").await;
    create(&router, "c", "Pending").await;
    request_json(
        &router,
        json_request(Method::PUT, &format!("/project/{}/changeFavorite", a), None),
    )
    .await;
    request_json(
        &router,
        json_request(Method::PUT, &format!("/project/{}/changeQuickAccess", b), None),
    )
    .await;

    let (status, body) =
        request_json(&router, json_request(Method::GET, "/project/statistics", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalProjects"], 3);
    assert_eq!(body["completedProjects"], 1);
    assert_eq!(body["ongoingProjects"], 1);
    assert_eq!(body["pendingProjects"], 1);
    assert_eq!(body["favorite"][0]["id"], a);
    assert_eq!(body["quick"][0]["id"], b);
}

#[tokio::test]
async fn test_delete_purges_all_views() {
    let router = test_server(None).router();
    let id = create(&router, "a", "Pending").await;
    request_json(
        &router,
        json_request(Method::PUT, &format!("/project/{}/changeFavorite", id), None),
    )
    .await;
    request_json(
        &router,
        json_request(Method::PUT, &format!("/project/{}/changeQuickAccess", id), None),
    )
    .await;

    let (status, body) = request_json(
        &router,
        json_request(Method::DELETE, &format!("/projects/{}", id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted");

    let (_, body) =
        request_json(&router, json_request(Method::GET, "/project/statistics", None)).await;
    assert_eq!(body["totalProjects"], 0);
    assert!(body["favorite"].as_array().unwrap().is_empty());
    assert!(body["quick"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_token_gate() {
    let router = test_server(Some("secret")).router();

    let (status, body) = request_json(&router, json_request(Method::GET, "/projects", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let request = Request::builder()
        .uri("/projects")
        .header("authorization", "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = request_json(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/projects")
        .header("authorization", "Bearer secret")
        .body(Body::empty())
        .unwrap();
    let (status, _) = request_json(&router, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_server_start_and_stop() {
    let server = test_server(None);
    let handle = server.start().await.unwrap();
    let port = handle.port();
    assert_ne!(port, 0);

    let response = reqwest::get(format!("{}/api/health", handle.base_url()))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let health = format!("{}/api/health", handle.base_url());
    handle.shutdown_and_wait().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(reqwest::get(health).await.is_err());
}

#[tokio::test]
async fn test_server_port_validation() {
    let config = ServerConfig {
        port: 80,
        ..ServerConfig::default()
    };
    let server = ProjectServer::new(config, Arc::new(Mutex::new(Database::new_in_memory().unwrap())));
    assert!(server.start().await.is_err());
}
