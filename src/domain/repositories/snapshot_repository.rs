// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::snapshot::Snapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 快照仓库特质
///
/// 快照只追加不修改
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// 保存新快照
    async fn create(&self, snapshot: &Snapshot) -> Result<Snapshot, RepositoryError>;
    /// 查找 (目标, 页面) 最近一次的快照
    async fn find_latest(
        &self,
        target_id: Uuid,
        page_url: &str,
    ) -> Result<Option<Snapshot>, RepositoryError>;
    /// 目标最近一次被扫描的时间
    async fn find_last_scanned_at(
        &self,
        target_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError>;
}
