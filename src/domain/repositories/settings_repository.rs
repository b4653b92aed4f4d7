// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use async_trait::async_trait;
use std::collections::HashMap;

/// 键值设置仓库特质
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// 读取全部设置
    async fn load_all(&self) -> Result<HashMap<String, String>, RepositoryError>;
    /// 批量写入设置，全部成功或全部失败
    async fn upsert_many(&self, values: &HashMap<String, String>) -> Result<(), RepositoryError>;
}
