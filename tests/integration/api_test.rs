// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{test_db, FixedClassifier, RecordingEmail, RecordingWebhook, StubFetcher};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use axum_test::TestServer;
use compwatch::domain::models::change::Severity;
use compwatch::domain::repositories::settings_repository::SettingsRepository;
use compwatch::domain::services::notification_service::NotificationDispatcher;
use compwatch::domain::services::scan_service::ScanService;
use compwatch::infrastructure::repositories::change_repo_impl::ChangeRepoImpl;
use compwatch::infrastructure::repositories::settings_repo_impl::SettingsRepoImpl;
use compwatch::infrastructure::repositories::snapshot_repo_impl::SnapshotRepoImpl;
use compwatch::infrastructure::repositories::target_repo_impl::TargetRepoImpl;
use compwatch::presentation::routes::{self, AppComponents};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

struct TestApp {
    server: TestServer,
    fetcher: Arc<StubFetcher>,
    webhook: Arc<RecordingWebhook>,
}

/// 构建使用内存数据库和测试替身的路由
async fn build_router() -> (Router, Arc<StubFetcher>, Arc<RecordingWebhook>) {
    let db = test_db().await;
    let target_repo = Arc::new(TargetRepoImpl::new(db.clone()));
    let snapshot_repo = Arc::new(SnapshotRepoImpl::new(db.clone()));
    let change_repo = Arc::new(ChangeRepoImpl::new(db.clone()));
    let settings_repo: Arc<dyn SettingsRepository> = Arc::new(SettingsRepoImpl::new(db.clone()));

    let fetcher = StubFetcher::new();
    let webhook = RecordingWebhook::new();
    let dispatcher = Arc::new(NotificationDispatcher::new(
        settings_repo.clone(),
        webhook.clone(),
        RecordingEmail::new(),
    ));

    let scan_service = Arc::new(ScanService::new(
        target_repo.clone(),
        snapshot_repo.clone(),
        change_repo.clone(),
        fetcher.clone(),
        FixedClassifier::new(Severity::High, "Pricing page rewritten"),
        dispatcher.clone(),
    ));

    let app = routes::routes(AppComponents {
        target_repo,
        snapshot_repo,
        change_repo,
        settings_repo,
        scan_service,
        dispatcher,
    });

    (app, fetcher, webhook)
}

async fn create_test_app() -> TestApp {
    let (app, fetcher, webhook) = build_router().await;
    TestApp {
        server: TestServer::new(app).unwrap(),
        fetcher,
        webhook,
    }
}

async fn create_acme(server: &TestServer) -> Value {
    let response = server
        .post("/api/competitors")
        .json(&json!({
            "name": "Acme",
            "url": "https://acme.test",
            "pages": ["https://acme.test/pricing"]
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _, _) = build_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_id_is_rejected() {
    let app = create_test_app().await;

    let response = app.server.get("/api/competitors/not-a-uuid").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_competitor_lifecycle() {
    let app = create_test_app().await;
    let created = create_acme(&app.server).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "Acme");

    let list: Value = app.server.get("/api/competitors").await.json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id.as_str());
    assert!(list[0]["lastScannedAt"].is_null());

    let detail = app.server.get(&format!("/api/competitors/{}", id)).await;
    assert_eq!(detail.status_code(), StatusCode::OK);
    let detail: Value = detail.json();
    assert_eq!(detail["changes"], json!([]));

    let deleted = app.server.delete(&format!("/api/competitors/{}", id)).await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(deleted.json::<Value>(), json!({ "success": true }));

    let missing = app.server.get(&format!("/api/competitors/{}", id)).await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_competitor_validation() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/competitors")
        .json(&json!({
            "name": "Acme",
            "url": "https://acme.test",
            "pages": []
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/api/competitors")
        .json(&json!({
            "name": "Acme",
            "url": "https://acme.test",
            "pages": ["javascript:alert(1)"]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scan_requires_target_id() {
    let app = create_test_app().await;

    let response = app.server.post("/api/scan").json(&json!({})).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "targetId is required");

    let response = app
        .server
        .post("/api/scan")
        .json(&json!({ "targetId": Uuid::new_v4() }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

/// 扫描接口返回逐页状态，变更出现在动态中
#[tokio::test]
async fn test_scan_and_change_feed() {
    let app = create_test_app().await;
    let created = create_acme(&app.server).await;
    let id = created["id"].as_str().unwrap().to_string();

    app.fetcher
        .set_page("https://acme.test/pricing", "Pricing\nStarter $10\nPro $30");
    let first: Value = app
        .server
        .post("/api/scan")
        .json(&json!({ "competitorId": id }))
        .await
        .json();
    assert_eq!(first["targetId"], id.as_str());
    assert_eq!(first["results"][0]["status"], "first_scan");
    assert!(first["results"][0].get("changeDetected").is_none());

    app.fetcher
        .set_page("https://acme.test/pricing", "Pricing\nStarter $12\nPro $36");
    let all: Value = app.server.post("/api/scan/all").await.json();
    let page = &all["results"][0]["pages"][0];
    assert_eq!(all["results"][0]["targetName"], "Acme");
    assert_eq!(page["pageUrl"], "https://acme.test/pricing");
    assert_eq!(page["status"], "change_detected");
    assert_eq!(page["changeDetected"], true);

    let feed: Value = app.server.get("/api/changes").await.json();
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["targetName"], "Acme");
    assert_eq!(feed[0]["severity"], "high");
    assert_eq!(feed[0]["summary"], "Pricing page rewritten");

    // No webhook configured yet
    assert_eq!(app.webhook.count(), 0);
}

#[tokio::test]
async fn test_settings_round_trip_and_test_webhook() {
    let app = create_test_app().await;

    let not_configured = app.server.post("/api/settings/test-webhook").await;
    assert_eq!(not_configured.status_code(), StatusCode::BAD_REQUEST);

    let saved = app
        .server
        .post("/api/settings")
        .json(&json!({
            "webhook_url": "https://hooks.acme.test/services/T000",
            "notify_min_severity": "low"
        }))
        .await;
    assert_eq!(saved.json::<Value>(), json!({ "ok": true }));

    let settings: Value = app.server.get("/api/settings").await.json();
    assert_eq!(settings["notify_min_severity"], "low");

    let sent = app.server.post("/api/settings/test-webhook").await;
    assert_eq!(sent.status_code(), StatusCode::OK);
    assert_eq!(app.webhook.count(), 1);

    let email = app.server.post("/api/settings/test-email").await;
    assert_eq!(email.status_code(), StatusCode::BAD_REQUEST);
    assert!(email.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("email_smtp_host"));
}
