//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::collections::BTreeSet;
use std::sync::Arc;

use banner_rotator::http;
use banner_rotator::model::BannerId;
use serde_json::{json, Value};

use crate::support::{rotator, seed_slot, TestRotator};

/// Bind to port 0 and return the base URL.
async fn start_server(rotator: Arc<TestRotator>) -> String {
    let app = http::router(rotator);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> (u16, Value) {
    let resp = client.post(url).json(&body).send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn health_check() {
    let base = start_server(Arc::new(rotator(1))).await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn create_rotate_select_click() {
    let rotator = Arc::new(rotator(1));
    let base = start_server(rotator.clone()).await;
    let client = reqwest::Client::new();

    let (status, slot) = post(&client, format!("{base}/slots"), json!({ "description": " top " })).await;
    assert_eq!(status, 200);
    assert_eq!(slot["description"], "top");
    let (_, banner) = post(&client, format!("{base}/banners"), json!({ "description": "sale" })).await;
    let (_, group) = post(&client, format!("{base}/groups"), json!({ "description": "teens" })).await;

    let (status, body) = post(
        &client,
        format!("{base}/rotations"),
        json!({ "slot_id": slot["id"], "banner_id": banner["id"] }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Rotation was created");

    let (status, chosen) = post(
        &client,
        format!("{base}/selections"),
        json!({ "slot_id": slot["id"], "group_id": group["id"] }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(chosen, banner);

    let (status, body) = post(
        &client,
        format!("{base}/clicks"),
        json!({ "slot_id": slot["id"], "banner_id": banner["id"], "group_id": group["id"] }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Click event was registered");
    assert_eq!(rotator.publisher().event_types(), vec!["view", "click"]);
}

#[tokio::test]
async fn invalid_input_is_bad_request() {
    let base = start_server(Arc::new(rotator(1))).await;
    let client = reqwest::Client::new();

    let (status, body) = post(&client, format!("{base}/slots"), json!({ "description": "  " })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "bad request: incorrect description");

    let (status, body) = post(
        &client,
        format!("{base}/selections"),
        json!({ "slot_id": 0, "group_id": 1 }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "bad request: incorrect slot id");

    // Missing field.
    let (status, body) = post(&client, format!("{base}/selections"), json!({ "slot_id": 1 })).await;
    assert_eq!(status, 400);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("bad request:"), "{error}");
    assert!(error.contains("group_id"), "{error}");

    // Not JSON at all.
    let resp = client
        .post(format!("{base}/clicks"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("bad request:"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn locked_selections_explore_distinct_banners() {
    let rotator = Arc::new(rotator(31).with_slot_locking(true));
    let fx = seed_slot(&rotator, 6);
    let base = start_server(rotator.clone()).await;
    let client = reqwest::Client::new();

    let requests: Vec<_> = (0..6)
        .map(|_| {
            let client = client.clone();
            let url = format!("{base}/selections");
            let body = json!({ "slot_id": fx.slot, "group_id": fx.group });
            tokio::spawn(async move { post(&client, url, body).await })
        })
        .collect();

    let mut picked = BTreeSet::new();
    for request in requests {
        let (status, banner) = request.await.unwrap();
        assert_eq!(status, 200);
        picked.insert(BannerId::new(banner["id"].as_i64().unwrap()));
    }
    assert_eq!(picked, fx.banners.iter().copied().collect());
    assert!(rotator.slot_locks().unwrap().is_empty());
}

#[tokio::test]
async fn rotator_errors_map_to_status() {
    let rotator = Arc::new(rotator(1));
    let slot = rotator.create_slot("empty").unwrap();
    let banner = rotator.create_banner("b").unwrap();
    let group = rotator.create_group("g").unwrap();
    let base = start_server(rotator).await;
    let client = reqwest::Client::new();

    // No banners in rotation yet.
    let (status, body) = post(
        &client,
        format!("{base}/selections"),
        json!({ "slot_id": slot.id, "group_id": group.id }),
    )
    .await;
    assert_eq!(status, 404);
    assert!(body["error"].as_str().unwrap().contains("empty candidate set"));

    let rotation = json!({ "slot_id": slot.id, "banner_id": banner.id });
    let (status, _) = post(&client, format!("{base}/rotations"), rotation.clone()).await;
    assert_eq!(status, 200);
    let (status, _) = post(&client, format!("{base}/rotations"), rotation.clone()).await;
    assert_eq!(status, 409);

    let resp = client
        .delete(format!("{base}/rotations"))
        .json(&rotation)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Rotation was deleted");

    let resp = client
        .delete(format!("{base}/rotations"))
        .json(&rotation)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
