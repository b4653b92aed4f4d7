// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::settings_repository::SettingsRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::setting;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::collections::HashMap;
use std::sync::Arc;

/// 键值设置仓库实现
#[derive(Clone)]
pub struct SettingsRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl SettingsRepoImpl {
    /// 创建新的设置仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepository for SettingsRepoImpl {
    async fn load_all(&self) -> Result<HashMap<String, String>, RepositoryError> {
        let rows = setting::Entity::find().all(self.db.as_ref()).await?;

        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }

    async fn upsert_many(&self, values: &HashMap<String, String>) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        for (key, value) in values {
            let model = setting::ActiveModel {
                key: Set(key.clone()),
                value: Set(value.clone()),
            };

            setting::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(setting::Column::Key)
                        .update_column(setting::Column::Value)
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}
