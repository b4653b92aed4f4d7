// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::target::Target;
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// 监控目标仓库特质
#[async_trait]
pub trait TargetRepository: Send + Sync {
    /// 创建新目标
    async fn create(&self, target: &Target) -> Result<Target, RepositoryError>;
    /// 根据ID查找目标
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Target>, RepositoryError>;
    /// 列出全部目标，按创建时间倒序
    async fn list(&self) -> Result<Vec<Target>, RepositoryError>;
    /// 删除目标及其快照、变更
    ///
    /// # 返回值
    ///
    /// 目标存在并被删除时返回 `true`
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
