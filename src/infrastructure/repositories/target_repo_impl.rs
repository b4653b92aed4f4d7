// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::target::Target;
use crate::domain::repositories::target_repository::{RepositoryError, TargetRepository};
use crate::infrastructure::database::entities::{change, snapshot, target};
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 监控目标仓库实现
#[derive(Clone)]
pub struct TargetRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl TargetRepoImpl {
    /// 创建新的目标仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TargetRepository for TargetRepoImpl {
    async fn create(&self, target: &Target) -> Result<Target, RepositoryError> {
        let model = target::ActiveModel {
            id: Set(target.id),
            name: Set(target.name.clone()),
            url: Set(target.url.clone()),
            pages: Set(target.pages.clone()),
            created_at: Set(target.created_at.into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(target.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Target>, RepositoryError> {
        let model = target::Entity::find_by_id(id).one(self.db.as_ref()).await?;

        Ok(model.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Target>, RepositoryError> {
        let models = target::Entity::find()
            .order_by_desc(target::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let txn = self.db.begin().await?;

        // Remove dependents explicitly; sqlite only cascades with foreign_keys enabled
        let snapshot_ids: Vec<Uuid> = snapshot::Entity::find()
            .select_only()
            .column(snapshot::Column::Id)
            .filter(snapshot::Column::TargetId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        if !snapshot_ids.is_empty() {
            change::Entity::delete_many()
                .filter(change::Column::SnapshotId.is_in(snapshot_ids))
                .exec(&txn)
                .await?;
        }

        snapshot::Entity::delete_many()
            .filter(snapshot::Column::TargetId.eq(id))
            .exec(&txn)
            .await?;

        let result = target::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }
}

impl From<target::Model> for Target {
    fn from(model: target::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            url: model.url,
            pages: model.pages,
            created_at: model.created_at.into(),
        }
    }
}
