//! End-to-end tests driving the real router over a loopback listener.

use std::{collections::HashMap, time::Duration};

use compress_service::{build_router, AppState, ServiceConfig};
use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};

struct TestApp {
    base_url: String,
    client: Client,
}

impl TestApp {
    async fn spawn(vars: &[(&str, &str)]) -> Self {
        let mut env: HashMap<String, String> = HashMap::from([
            ("PROCESSING_DELAY_MS".to_string(), "20".to_string()),
        ]);
        for (key, value) in vars {
            env.insert(key.to_string(), value.to_string());
        }

        let config = ServiceConfig::from_lookup(|name| env.get(name).cloned()).unwrap();
        let app_state = AppState::new(config).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(app_state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", address),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn upload(&self, files: &[(&str, &str, usize)]) -> reqwest::Response {
        let mut form = multipart::Form::new();
        for (name, mime_type, size) in files {
            let part = multipart::Part::bytes(vec![1u8; *size])
                .file_name(name.to_string())
                .mime_str(mime_type)
                .unwrap();
            form = form.part("file", part);
        }
        self.client
            .post(self.url("/api/v1/files"))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    async fn upload_ids(&self, files: &[(&str, &str, usize)]) -> Vec<String> {
        let response = self.upload(files).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        body["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|file| file["id"].as_str().unwrap().to_string())
            .collect()
    }

    async fn get(&self, path: &str) -> Value {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {}", path);
        response.json().await.unwrap()
    }

    async fn put(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str) -> reqwest::Response {
        self.client.post(self.url(path)).send().await.unwrap()
    }

    async fn wait_for_state(&self, id: &str, state: &str) -> Value {
        for _ in 0..200 {
            let file = self.get(&format!("/api/v1/files/{}", id)).await;
            if file["processingState"] == state {
                return file;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("record {} never reached {}", id, state);
    }
}

#[tokio::test]
async fn test_upload_selects_first_file_and_keeps_order() {
    let app = TestApp::spawn(&[]).await;
    let ids = app
        .upload_ids(&[("report.pdf", "application/pdf", 1_000), ("photo.png", "image/png", 64)])
        .await;

    let listing = app.get("/api/v1/files").await;
    let files = listing["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["id"], ids[0].as_str());
    assert_eq!(files[0]["selected"], true);
    assert_eq!(files[0]["compressionLevel"], 50);
    assert_eq!(files[0]["processingState"], "Idle");
    assert_eq!(files[0]["hasPreview"], false);
    assert_eq!(files[1]["hasPreview"], true);

    let preview = app
        .client
        .get(app.url(&format!("/api/v1/files/{}/preview", ids[1])))
        .send()
        .await
        .unwrap();
    assert_eq!(preview.status(), StatusCode::OK);
    assert_eq!(preview.headers()["content-type"], "image/png");
    assert_eq!(preview.bytes().await.unwrap().len(), 64);
}

#[tokio::test]
async fn test_rejected_upload_adds_nothing() {
    let app = TestApp::spawn(&[("MAX_UPLOAD_BYTES", "100")]).await;

    let response = app
        .upload(&[("ok.pdf", "application/pdf", 10), ("archive.zip", "application/zip", 10)])
        .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let response = app.upload(&[("big.pdf", "application/pdf", 101)]).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let session = app.get("/api/v1/session").await;
    assert_eq!(session["fileCount"], 0);
}

#[tokio::test]
async fn test_level_control_inputs() {
    let app = TestApp::spawn(&[("LEVEL_SNAP_POINTS", "20,50,80"), ("LEVEL_SNAP_THRESHOLD", "5")]).await;
    let ids = app
        .upload_ids(&[("a.pdf", "application/pdf", 10), ("b.pdf", "application/pdf", 10)])
        .await;
    let level_path = format!("/api/v1/files/{}/level", ids[0]);

    let body: Value = app.put(&level_path, json!({ "raw": 48.0 })).await.json().await.unwrap();
    assert_eq!(body["committedLevel"], 50);

    let body: Value = app.put(&level_path, json!({ "raw": 33.0 })).await.json().await.unwrap();
    assert_eq!(body["committedLevel"], 33);

    let body: Value = app.put(&level_path, json!({ "key": "PageUp" })).await.json().await.unwrap();
    assert_eq!(body["committedLevel"], 43);

    let body: Value = app.put(&level_path, json!({ "level": 150 })).await.json().await.unwrap();
    assert_eq!(body["committedLevel"], 100);
    assert_eq!(body["updatedCount"], 1);

    // not selected, not batch: no-op
    let other_path = format!("/api/v1/files/{}/level", ids[1]);
    let body: Value = app.put(&other_path, json!({ "level": 10 })).await.json().await.unwrap();
    assert_eq!(body["updatedCount"], 0);

    let response = app.put(&level_path, json!({ "level": 10, "raw": 4.0 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_mode_sets_every_level() {
    let app = TestApp::spawn(&[]).await;
    let ids = app
        .upload_ids(&[
            ("a.pdf", "application/pdf", 10),
            ("b.pdf", "application/pdf", 10),
            ("c.pdf", "application/pdf", 10),
        ])
        .await;

    app.put(&format!("/api/v1/files/{}/level", ids[0]), json!({ "level": 70 }))
        .await;
    let response = app.put("/api/v1/session/batch", json!({ "enabled": true })).await;
    assert_eq!(response.status(), StatusCode::OK);
    // batch level starts at the default, not at the first record's
    assert_eq!(app.get("/api/v1/session").await["currentLevel"], 50);

    let body: Value = app
        .put(&format!("/api/v1/files/{}/level", ids[2]), json!({ "level": 85 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["updatedCount"], 3);

    let listing = app.get("/api/v1/files").await;
    for file in listing["files"].as_array().unwrap() {
        assert_eq!(file["compressionLevel"], 85);
        assert_eq!(file["qualityLabel"], "Maximum Compression");
    }
    assert_eq!(app.get("/api/v1/session").await["currentLevel"], 85);
}

#[tokio::test]
async fn test_process_then_aggregate_and_export() {
    let app = TestApp::spawn(&[]).await;
    let ids = app
        .upload_ids(&[("a.pdf", "application/pdf", 1_000), ("b.pdf", "application/pdf", 1_000)])
        .await;
    app.put(&format!("/api/v1/files/{}/level", ids[0]), json!({ "level": 70 }))
        .await;

    let response = app.post(&format!("/api/v1/files/{}/process", ids[0])).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["started"], true);

    let file = app.wait_for_state(&ids[0], "Completed").await;
    assert_eq!(file["compressedSizeBytes"], 440);
    assert_eq!(file["savingsPercent"], 56.0);

    let aggregates = app.get("/api/v1/session/aggregates").await;
    assert_eq!(aggregates["totalOriginal"], 2_000);
    assert_eq!(aggregates["totalCompressed"], 1_440);
    assert_eq!(aggregates["savingsPercent"], 28.0);
    assert_eq!(aggregates["processedCount"], 1);

    let export = app.get("/api/v1/session/export").await;
    assert_eq!(export["count"], 1);
    assert_eq!(export["files"][0]["id"], ids[0].as_str());
}

#[tokio::test]
async fn test_reprocessing_keeps_previous_result_visible() {
    let app = TestApp::spawn(&[("PROCESSING_DELAY_MS", "400")]).await;
    let ids = app.upload_ids(&[("a.pdf", "application/pdf", 1_000)]).await;
    let level_path = format!("/api/v1/files/{}/level", ids[0]);
    let process_path = format!("/api/v1/files/{}/process", ids[0]);

    app.put(&level_path, json!({ "level": 70 })).await;
    app.post(&process_path).await;
    app.wait_for_state(&ids[0], "Completed").await;
    let before = app.get("/api/v1/session/aggregates").await;
    assert_eq!(before["totalCompressed"], 440);

    app.put(&level_path, json!({ "level": 90 })).await;
    let response = app.post(&process_path).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let file = app.get(&format!("/api/v1/files/{}", ids[0])).await;
    assert_eq!(file["processingState"], "Processing");
    assert_eq!(file["compressedSizeBytes"], Value::Null);
    assert_eq!(file["previousCompressedSizeBytes"], 440);
    assert_eq!(app.get("/api/v1/session/aggregates").await, before);
    assert_eq!(app.get("/api/v1/session/export").await["count"], 1);

    // 1000 * (1 - 0.9 * 0.8)
    let file = app.wait_for_state(&ids[0], "Completed").await;
    assert_eq!(file["compressedSizeBytes"], 280);
    assert_eq!(app.get("/api/v1/session/aggregates").await["totalCompressed"], 280);
}

#[tokio::test]
async fn test_process_all_and_lossless() {
    let app = TestApp::spawn(&[]).await;
    let ids = app
        .upload_ids(&[("a.pdf", "application/pdf", 1_000), ("b.pdf", "application/pdf", 2_000)])
        .await;
    app.put("/api/v1/session/lossless", json!({ "enabled": true })).await;

    let body: Value = app.post("/api/v1/files/process").await.json().await.unwrap();
    assert_eq!(body["started"], 2);

    let first = app.wait_for_state(&ids[0], "Completed").await;
    let second = app.wait_for_state(&ids[1], "Completed").await;
    // level 50 lossless: 1 - 0.5 * 0.4
    assert_eq!(first["compressedSizeBytes"], 800);
    assert_eq!(second["compressedSizeBytes"], 1_600);
}

#[tokio::test]
async fn test_unknown_records() {
    let app = TestApp::spawn(&[]).await;
    let missing = "00000000-0000-4000-8000-000000000000";

    let response = app.post(&format!("/api/v1/files/{}/process", missing)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.post(&format!("/api/v1/files/{}/select", missing)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .delete(app.url(&format!("/api/v1/files/{}", missing)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_remove_selected_moves_selection_and_releases_preview() {
    let app = TestApp::spawn(&[]).await;
    let ids = app
        .upload_ids(&[("a.png", "image/png", 10), ("b.png", "image/png", 10)])
        .await;

    let health = app.get("/api/v1/health").await;
    assert_eq!(health["session"]["cachedPreviews"], 2);
    let view = app.get("/api/v1/comparison").await;
    assert_eq!(view["inspectedId"], ids[0].as_str());

    let response = app
        .client
        .delete(app.url(&format!("/api/v1/files/{}", ids[0])))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let session = app.get("/api/v1/session").await;
    assert_eq!(session["selectedId"], ids[1].as_str());
    let view = app.get("/api/v1/comparison").await;
    assert_eq!(view["inspectedId"], ids[1].as_str());
    assert_eq!(view["position"], 50.0);

    let response = app
        .put("/api/v1/comparison/inspect", json!({ "id": ids[0] }))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let health = app.get("/api/v1/health").await;
    assert_eq!(health["session"]["cachedPreviews"], 1);
}

#[tokio::test]
async fn test_comparison_cursor_follows_inspected_record() {
    let app = TestApp::spawn(&[]).await;
    let ids = app
        .upload_ids(&[("a.pdf", "application/pdf", 10), ("b.pdf", "application/pdf", 10)])
        .await;

    let response = app.post(&format!("/api/v1/files/{}/select", ids[0])).await;
    assert_eq!(response.status(), StatusCode::OK);

    let view: Value = app
        .put("/api/v1/comparison/drag", json!({ "offsetX": 150.0, "width": 600.0 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["position"], 25.0);
    assert_eq!(view["inspectedId"], ids[0].as_str());

    let view: Value = app
        .put("/api/v1/comparison/inspect", json!({ "id": ids[1] }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["position"], 50.0);

    let view: Value = app
        .put("/api/v1/comparison/drag", json!({ "offsetX": 900.0, "width": 600.0 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["position"], 100.0);

    let view: Value = app.post("/api/v1/comparison/reset").await.json().await.unwrap();
    assert_eq!(view["position"], 50.0);
}
