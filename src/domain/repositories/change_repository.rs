// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::change::{ChangeFeedItem, ChangeRecord};
use async_trait::async_trait;
use uuid::Uuid;

/// 变更记录仓库特质
#[async_trait]
pub trait ChangeRepository: Send + Sync {
    /// 保存变更记录
    async fn create(&self, change: &ChangeRecord) -> Result<ChangeRecord, RepositoryError>;
    /// 最近的变更，按检测时间倒序，附带目标信息
    async fn find_recent(&self, limit: u64) -> Result<Vec<ChangeFeedItem>, RepositoryError>;
    /// 某个目标的全部变更，按检测时间倒序
    async fn find_by_target(&self, target_id: Uuid) -> Result<Vec<ChangeRecord>, RepositoryError>;
}
