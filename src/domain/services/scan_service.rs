// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::change::ChangeRecord;
use crate::domain::models::scan::{
    PageScanResult, PageStatus, ScanAllResponse, ScanTargetResponse, TargetScanResult,
    MALFORMED_PAGES_MESSAGE,
};
use crate::domain::models::snapshot::Snapshot;
use crate::domain::models::target::Target;
use crate::domain::repositories::change_repository::ChangeRepository;
use crate::domain::repositories::snapshot_repository::SnapshotRepository;
use crate::domain::repositories::target_repository::TargetRepository;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::classifier_service::ChangeClassifier;
use crate::domain::services::diff_service::compute_diff;
use crate::domain::services::notification_service::ChangeNotifier;
use crate::engines::traits::PageFetcher;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 扫描错误类型
///
/// 只有持久化错误和目标不存在会中断扫描，其余错误都编码进页面结果
#[derive(Error, Debug)]
pub enum ScanError {
    /// 目标不存在
    #[error("Target not found: {0}")]
    TargetNotFound(Uuid),
    /// 持久化错误
    #[error("Persistence error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 扫描编排服务
///
/// 按顺序处理目标及其页面：抓取 → 查找基线 → 保存快照 → 差异 → 分类 → 保存变更 → 通知。
/// 同一目标的扫描由目标级互斥锁串行化，定时扫描与手动扫描重叠时后者等待前者完成。
pub struct ScanService {
    target_repo: Arc<dyn TargetRepository>,
    snapshot_repo: Arc<dyn SnapshotRepository>,
    change_repo: Arc<dyn ChangeRepository>,
    fetcher: Arc<dyn PageFetcher>,
    classifier: Arc<dyn ChangeClassifier>,
    notifier: Arc<dyn ChangeNotifier>,
    target_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl ScanService {
    /// 创建新的扫描服务
    pub fn new(
        target_repo: Arc<dyn TargetRepository>,
        snapshot_repo: Arc<dyn SnapshotRepository>,
        change_repo: Arc<dyn ChangeRepository>,
        fetcher: Arc<dyn PageFetcher>,
        classifier: Arc<dyn ChangeClassifier>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            target_repo,
            snapshot_repo,
            change_repo,
            fetcher,
            classifier,
            notifier,
            target_locks: DashMap::new(),
        }
    }

    /// 扫描单个目标
    ///
    /// # 参数
    ///
    /// * `target_id` - 目标ID
    ///
    /// # 返回值
    ///
    /// * `Ok(ScanTargetResponse)` - 每个页面一条结果
    /// * `Err(ScanError)` - 目标不存在或持久化失败
    pub async fn scan_target(&self, target_id: Uuid) -> Result<ScanTargetResponse, ScanError> {
        let target = self
            .target_repo
            .find_by_id(target_id)
            .await?
            .ok_or(ScanError::TargetNotFound(target_id))?;

        info!("Scanning target {} ({})", target.name, target.id);
        let results = self.scan_pages(&target).await?;

        Ok(ScanTargetResponse { target_id, results })
    }

    /// 扫描全部目标
    ///
    /// 页面列表损坏的目标只产生一条合成的错误结果，不影响其他目标
    pub async fn scan_all(&self) -> Result<ScanAllResponse, ScanError> {
        let started = Instant::now();
        let targets = self.target_repo.list().await?;
        info!("Scanning {} target(s)", targets.len());

        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            let pages = self.scan_pages(&target).await?;
            results.push(TargetScanResult {
                target_id: target.id,
                target_name: target.name,
                pages,
            });
        }

        let response = ScanAllResponse { results };
        metrics::histogram!("scan_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            "Scan complete: {} page(s), {} error(s) in {:?}",
            response.page_count(),
            response.error_count(),
            started.elapsed()
        );
        Ok(response)
    }

    async fn scan_pages(&self, target: &Target) -> Result<Vec<PageScanResult>, ScanError> {
        let page_urls = match target.page_urls() {
            Ok(page_urls) => page_urls,
            Err(e) => {
                warn!("Skipping target {} with malformed pages: {}", target.id, e);
                metrics::counter!("scan_pages_total", "status" => "error").increment(1);
                return Ok(vec![PageScanResult::error("", MALFORMED_PAGES_MESSAGE)]);
            }
        };

        let lock = self.lock_for(target.id);
        let guard = lock.lock().await;
        let outcome = self.scan_locked(target, page_urls).await;
        drop(guard);
        drop(lock);
        self.release_lock(target.id);
        outcome
    }

    async fn scan_locked(
        &self,
        target: &Target,
        page_urls: Vec<String>,
    ) -> Result<Vec<PageScanResult>, ScanError> {
        let mut results = Vec::with_capacity(page_urls.len());
        for page_url in page_urls {
            let status = self.scan_page(target, &page_url).await?;
            metrics::counter!("scan_pages_total", "status" => status.label()).increment(1);
            results.push(PageScanResult::new(page_url, status));
        }
        Ok(results)
    }

    async fn scan_page(&self, target: &Target, page_url: &str) -> Result<PageStatus, ScanError> {
        let content = match self.fetcher.fetch_text(page_url).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to fetch {} for {}: {}", page_url, target.name, e);
                return Ok(PageStatus::Error(e.to_string()));
            }
        };

        let previous = self.snapshot_repo.find_latest(target.id, page_url).await?;

        // The new snapshot becomes the next baseline even if classification fails
        let snapshot = self
            .snapshot_repo
            .create(&Snapshot::new(target.id, page_url.to_string(), content))
            .await?;

        let Some(previous) = previous else {
            debug!("First snapshot for {} ({})", page_url, target.name);
            return Ok(PageStatus::FirstScan);
        };

        // Myers diff is CPU bound, keep it off the async workers
        let old_text = previous.content;
        let new_text = snapshot.content.clone();
        let diff = tokio::task::spawn_blocking(move || compute_diff(&old_text, &new_text)).await;
        let diff = match diff {
            Ok(diff) => diff,
            Err(join_err) => {
                warn!("Diff worker failed for {} ({}): {}", page_url, target.name, join_err);
                return Ok(PageStatus::Error(format!("Diff failed: {}", join_err)));
            }
        };
        if !diff.significant {
            debug!("No significant change on {} ({}%)", page_url, diff.change_percent);
            return Ok(PageStatus::NoChange);
        }

        let classification = self
            .classifier
            .classify(&target.name, page_url, &diff)
            .await
            .into_classification();

        let change = ChangeRecord::new(
            snapshot.id,
            page_url.to_string(),
            &diff.raw_diff,
            classification.summary,
            classification.severity,
        );
        let change = self.change_repo.create(&change).await?;
        metrics::counter!("changes_detected_total").increment(1);
        info!(
            "Change detected for {} on {} ({}%, {})",
            target.name, page_url, diff.change_percent, change.severity
        );

        let report = self.notifier.dispatch(&change, target).await;
        debug!("Notification report for change {}: {:?}", change.id, report);

        Ok(PageStatus::ChangeDetected)
    }

    fn lock_for(&self, target_id: Uuid) -> Arc<Mutex<()>> {
        self.target_locks
            .entry(target_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    // Drop the entry once no scan holds or waits on it
    fn release_lock(&self, target_id: Uuid) {
        self.target_locks
            .remove_if(&target_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// 当前持有或等待中的目标锁数量
    pub fn active_target_locks(&self) -> usize {
        self.target_locks.len()
    }
}
