//! BDD step definitions for the upload API

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use cucumber::{given, then, when};
use tower::ServiceExt;

use pressure_watcher::api::{build_router, ApiState};
use pressure_watcher::config::ServerConfig;
use pressure_watcher::gauge::PlaceholderGaugeReader;
use pressure_watcher::store::{MemoryStore, ReadingStore, StoreHandle};

use crate::world::WatcherWorld;

const BOUNDARY: &str = "bdd-boundary";

fn multipart_request(field: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"gauge.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload-image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(world: &mut WatcherWorld, request: Request<Body>) {
    let state = ApiState {
        store: if world.api_has_store {
            Some(Arc::new(world.store().clone()) as StoreHandle)
        } else {
            None
        },
        gauge: Arc::new(PlaceholderGaugeReader),
        persist_images: false,
        max_readings: 100,
    };
    let app = build_router(state, &ServerConfig::default());
    let response = app.oneshot(request).await.unwrap();
    world.response_status = Some(response.status().as_u16());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    world.response_json = serde_json::from_slice(&body).ok();
}

#[given("the upload API with a reading store")]
fn api_with_store(world: &mut WatcherWorld) {
    world.store = Some(MemoryStore::new(100));
    world.api_has_store = true;
}

#[given("the upload API without a reading store")]
fn api_without_store(world: &mut WatcherWorld) {
    world.store = Some(MemoryStore::new(100));
    world.api_has_store = false;
}

#[when("the root endpoint is requested")]
async fn request_root(world: &mut WatcherWorld) {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    send(world, request).await;
}

#[when("an image is uploaded")]
async fn upload_image(world: &mut WatcherWorld) {
    send(world, multipart_request("file", &[0xff, 0xd8, 0xff, 0xe0])).await;
}

#[when("a form without a file part is uploaded")]
async fn upload_without_file(world: &mut WatcherWorld) {
    send(world, multipart_request("image", &[0xff, 0xd8])).await;
}

#[when("the upload endpoint is called without a body")]
async fn upload_without_body(world: &mut WatcherWorld) {
    let request = Request::builder()
        .method("POST")
        .uri("/upload-image")
        .body(Body::empty())
        .unwrap();
    send(world, request).await;
}

#[then(expr = "the response status should be {int}")]
fn response_status(world: &mut WatcherWorld, expected: u16) {
    assert_eq!(world.response_status, Some(expected));
}

#[then(expr = "the response field {string} should be {string}")]
fn response_field(world: &mut WatcherWorld, field: String, expected: String) {
    let json = world.response_json.as_ref().expect("no JSON response");
    assert_eq!(json[&field], expected.as_str(), "full response: {json}");
}

#[then(expr = "the response should carry a {string} field")]
fn response_has_field(world: &mut WatcherWorld, field: String) {
    let json = world.response_json.as_ref().expect("no JSON response");
    assert!(json.get(&field).is_some(), "full response: {json}");
}

#[then(expr = "the store should hold {int} reading(s)")]
async fn store_holds(world: &mut WatcherWorld, count: usize) {
    assert_eq!(world.store().len().await, count);
}

#[then("the stored reading should have a timestamp and pressure but no image")]
async fn stored_reading_shape(world: &mut WatcherWorld) {
    let latest = world.store().latest(1).await.unwrap();
    let reading = latest.first().expect("no stored reading");
    assert!(reading.observed_at().is_some());
    assert_eq!(reading.pressure, Some(0.0));
    assert!(reading.image.is_none());
}
