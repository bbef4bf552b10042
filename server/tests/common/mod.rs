#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use eventdesk_server::config::Config;
use eventdesk_server::routes::create_routes;
use eventdesk_server::state::AppState;
use eventdesk_server::store::{EventStore, MemoryEventStore};

/// A fresh in-memory store shared by every app built from it.
pub fn test_store() -> Arc<dyn EventStore> {
    Arc::new(MemoryEventStore::new())
}

/// The full router, with the same middleware stack production uses.
pub fn build_test_app(store: Arc<dyn EventStore>) -> Router {
    create_routes(AppState::new(store, Config::default()))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POSTs `body` verbatim, with an optional `Content-Type`.
pub async fn post_raw(
    app: Router,
    uri: &str,
    content_type: Option<&str>,
    body: &'static str,
) -> Response<Body> {
    let mut request = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    app.oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Asserts a `303 See Other` to `location`.
pub fn assert_redirect(response: &Response<Body>, location: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], location);
}

/// GETs `uri` and returns the `data` field of the success envelope.
pub async fn get_data(store: &Arc<dyn EventStore>, uri: &str) -> Value {
    let response = get(build_test_app(store.clone()), uri).await;
    assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    body_json(response).await["data"].clone()
}

pub async fn create_category(store: &Arc<dyn EventStore>, name: &str) -> String {
    let response = post_json(
        build_test_app(store.clone()),
        "/categories/new",
        serde_json::json!({ "name": name, "description": "" }),
    )
    .await;
    assert_redirect(&response, "/categories");
    find_id(&get_data(store, "/categories").await["categories"], name)
}

pub async fn create_participant(store: &Arc<dyn EventStore>, name: &str, email: &str) -> String {
    let response = post_json(
        build_test_app(store.clone()),
        "/participants/new",
        serde_json::json!({ "name": name, "email": email }),
    )
    .await;
    assert_redirect(&response, "/participants");
    find_id(&get_data(store, "/participants").await["participants"], name)
}

pub async fn create_event(store: &Arc<dyn EventStore>, body: Value) -> String {
    let name = body["name"].as_str().unwrap().trim().to_string();
    let response = post_json(build_test_app(store.clone()), "/events/new", body).await;
    assert_redirect(&response, "/events");
    find_id(&get_data(store, "/events").await["events"], &name)
}

/// Id of the first item in `items` whose `name` equals `name`.
pub fn find_id(items: &Value, name: &str) -> String {
    items
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["name"] == name)
        .unwrap_or_else(|| panic!("no item named {name}"))["id"]
        .as_str()
        .unwrap()
        .to_string()
}

pub fn names(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}
