// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 测试替身
//!
//! 内存仓库、可编排的抓取器、分类器和通知渠道

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use compwatch::domain::models::change::{ChangeFeedItem, ChangeRecord, Severity};
use compwatch::domain::models::notification::SmtpSettings;
use compwatch::domain::models::snapshot::Snapshot;
use compwatch::domain::models::target::Target;
use compwatch::domain::repositories::change_repository::ChangeRepository;
use compwatch::domain::repositories::settings_repository::SettingsRepository;
use compwatch::domain::repositories::snapshot_repository::SnapshotRepository;
use compwatch::domain::repositories::target_repository::TargetRepository;
use compwatch::domain::repositories::RepositoryError;
use compwatch::domain::services::classifier_service::{
    ChangeClassifier, Classification, ClassifierOutcome,
};
use compwatch::domain::services::diff_service::DiffResult;
use compwatch::domain::services::notification_service::{
    ChangeNotifier, DispatchReport, EmailMessage, EmailTransport, NotificationError,
    WebhookTransport,
};
use compwatch::domain::services::scan_service::ScanService;
use compwatch::engines::traits::{FetchError, PageFetcher};
use sea_orm::DbErr;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn storage_failure() -> RepositoryError {
    RepositoryError::Database(DbErr::Custom("storage unavailable".into()))
}

/// 内存仓库，同时实现目标、快照、变更和设置仓库
#[derive(Default)]
pub struct InMemoryRepos {
    pub targets: Mutex<Vec<Target>>,
    pub snapshots: Mutex<Vec<Snapshot>>,
    pub changes: Mutex<Vec<ChangeRecord>>,
    pub settings: Mutex<HashMap<String, String>>,
    pub fail_change_writes: AtomicBool,
    pub fail_settings_reads: AtomicBool,
}

impl InMemoryRepos {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_target(&self, name: &str, pages: &[&str]) -> Target {
        let pages: Vec<String> = pages.iter().map(|p| p.to_string()).collect();
        let target = Target::new(name.to_string(), format!("https://{}.test", name), &pages);
        self.targets.lock().unwrap().push(target.clone());
        target
    }

    /// 直接写入一条原始页面数据，模拟损坏的记录
    pub fn add_raw_target(&self, name: &str, raw_pages: &str) -> Target {
        let mut target = Target::new(name.to_string(), format!("https://{}.test", name), &[]);
        target.pages = raw_pages.to_string();
        self.targets.lock().unwrap().push(target.clone());
        target
    }

    pub fn set_settings(&self, pairs: &[(&str, &str)]) {
        let mut settings = self.settings.lock().unwrap();
        for (key, value) in pairs {
            settings.insert(key.to_string(), value.to_string());
        }
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn change_list(&self) -> Vec<ChangeRecord> {
        self.changes.lock().unwrap().clone()
    }
}

#[async_trait]
impl TargetRepository for InMemoryRepos {
    async fn create(&self, target: &Target) -> Result<Target, RepositoryError> {
        self.targets.lock().unwrap().push(target.clone());
        Ok(target.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Target>, RepositoryError> {
        Ok(self
            .targets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Target>, RepositoryError> {
        Ok(self.targets.lock().unwrap().clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut targets = self.targets.lock().unwrap();
        let before = targets.len();
        targets.retain(|t| t.id != id);
        Ok(targets.len() != before)
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepos {
    async fn create(&self, snapshot: &Snapshot) -> Result<Snapshot, RepositoryError> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(snapshot.clone())
    }

    async fn find_latest(
        &self,
        target_id: Uuid,
        page_url: &str,
    ) -> Result<Option<Snapshot>, RepositoryError> {
        // Insertion order stands in for capture time
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.target_id == target_id && s.page_url == page_url)
            .cloned())
    }

    async fn find_last_scanned_at(
        &self,
        target_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.target_id == target_id)
            .map(|s| s.created_at)
            .max())
    }
}

#[async_trait]
impl ChangeRepository for InMemoryRepos {
    async fn create(&self, change: &ChangeRecord) -> Result<ChangeRecord, RepositoryError> {
        if self.fail_change_writes.load(Ordering::SeqCst) {
            return Err(storage_failure());
        }
        self.changes.lock().unwrap().push(change.clone());
        Ok(change.clone())
    }

    async fn find_recent(&self, limit: u64) -> Result<Vec<ChangeFeedItem>, RepositoryError> {
        let snapshots = self.snapshots.lock().unwrap();
        let targets = self.targets.lock().unwrap();

        Ok(self
            .changes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit as usize)
            .filter_map(|change| {
                let snapshot = snapshots.iter().find(|s| s.id == change.snapshot_id)?;
                let target = targets.iter().find(|t| t.id == snapshot.target_id)?;
                Some(ChangeFeedItem {
                    change: change.clone(),
                    target_id: target.id,
                    target_name: target.name.clone(),
                    target_url: target.url.clone(),
                })
            })
            .collect())
    }

    async fn find_by_target(&self, target_id: Uuid) -> Result<Vec<ChangeRecord>, RepositoryError> {
        let snapshots = self.snapshots.lock().unwrap();
        Ok(self
            .changes
            .lock()
            .unwrap()
            .iter()
            .filter(|change| {
                snapshots
                    .iter()
                    .any(|s| s.id == change.snapshot_id && s.target_id == target_id)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepos {
    async fn load_all(&self) -> Result<HashMap<String, String>, RepositoryError> {
        if self.fail_settings_reads.load(Ordering::SeqCst) {
            return Err(storage_failure());
        }
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn upsert_many(&self, values: &HashMap<String, String>) -> Result<(), RepositoryError> {
        self.settings
            .lock()
            .unwrap()
            .extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }
}

/// 按URL返回预设内容的抓取器
#[derive(Default)]
pub struct StubFetcher {
    pages: Mutex<HashMap<String, Result<String, String>>>,
    pub calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_page(&self, url: &str, content: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(content.to_string()));
    }

    pub fn fail_page(&self, url: &str, message: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(message.to_string()));
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.pages.lock().unwrap().get(url) {
            Some(Ok(content)) => Ok(content.clone()),
            Some(Err(message)) => Err(FetchError::Other(message.clone())),
            None => Err(FetchError::HttpStatus(404)),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// 返回固定分类结果的分类器
pub struct FixedClassifier {
    outcome: Mutex<Option<Classification>>,
    pub calls: AtomicUsize,
    pub change_percents: Mutex<Vec<f64>>,
}

impl FixedClassifier {
    pub fn new(severity: Severity, summary: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(Some(Classification {
                summary: summary.to_string(),
                severity,
                key_changes: vec![],
            })),
            calls: AtomicUsize::new(0),
            change_percents: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(None),
            calls: AtomicUsize::new(0),
            change_percents: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChangeClassifier for FixedClassifier {
    async fn classify(
        &self,
        _target_name: &str,
        _page_url: &str,
        diff: &DiffResult,
    ) -> ClassifierOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.change_percents.lock().unwrap().push(diff.change_percent);
        match self.outcome.lock().unwrap().clone() {
            Some(classification) => ClassifierOutcome::Parsed(classification),
            None => ClassifierOutcome::Fallback,
        }
    }
}

/// 记录每次分发的通知器
#[derive(Default)]
pub struct RecordingNotifier {
    pub dispatched: Mutex<Vec<(ChangeRecord, Target)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.dispatched.lock().unwrap().len()
    }
}

#[async_trait]
impl ChangeNotifier for RecordingNotifier {
    async fn dispatch(&self, change: &ChangeRecord, target: &Target) -> DispatchReport {
        self.dispatched
            .lock()
            .unwrap()
            .push((change.clone(), target.clone()));
        DispatchReport::BelowThreshold
    }
}

/// 记录负载的 webhook 渠道，可设置为失败
#[derive(Default)]
pub struct RecordingWebhook {
    pub posts: Mutex<Vec<(String, Value)>>,
    pub fail_with_status: Mutex<Option<u16>>,
}

impl RecordingWebhook {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(status: u16) -> Arc<Self> {
        let webhook = Self::default();
        *webhook.fail_with_status.lock().unwrap() = Some(status);
        Arc::new(webhook)
    }

    pub fn count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }
}

#[async_trait]
impl WebhookTransport for RecordingWebhook {
    async fn post_json(&self, url: &str, payload: &Value) -> Result<(), NotificationError> {
        self.posts
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        match *self.fail_with_status.lock().unwrap() {
            Some(status) => Err(NotificationError::Status {
                status,
                body: "rejected".into(),
            }),
            None => Ok(()),
        }
    }
}

/// 记录邮件的 SMTP 渠道，可设置为失败
#[derive(Default)]
pub struct RecordingEmail {
    pub sent: Mutex<Vec<(SmtpSettings, EmailMessage)>>,
    pub fail: AtomicBool,
}

impl RecordingEmail {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let email = Self::default();
        email.fail.store(true, Ordering::SeqCst);
        Arc::new(email)
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailTransport for RecordingEmail {
    async fn send(
        &self,
        smtp: &SmtpSettings,
        message: &EmailMessage,
    ) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .unwrap()
            .push((smtp.clone(), message.clone()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::Smtp("connection refused".into()));
        }
        Ok(())
    }
}

/// 用内存替身组装扫描服务
pub fn scan_service(
    repos: &Arc<InMemoryRepos>,
    fetcher: &Arc<StubFetcher>,
    classifier: &Arc<FixedClassifier>,
    notifier: &Arc<RecordingNotifier>,
) -> ScanService {
    ScanService::new(
        repos.clone(),
        repos.clone(),
        repos.clone(),
        fetcher.clone(),
        classifier.clone(),
        notifier.clone(),
    )
}

/// 内存SQLite数据库，已执行全部迁移
///
/// 内存库每个连接都是独立的数据库，连接池固定为一个连接
pub async fn test_db() -> Arc<sea_orm::DatabaseConnection> {
    let settings = compwatch::config::settings::DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        min_connections: Some(1),
        connect_timeout: Some(5),
        idle_timeout: None,
    };

    let db = compwatch::infrastructure::database::connection::connect_and_migrate(&settings)
        .await
        .expect("failed to prepare test database");
    Arc::new(db)
}
