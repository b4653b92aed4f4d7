// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::snapshot::Snapshot;
use crate::domain::repositories::snapshot_repository::SnapshotRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::snapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 快照仓库实现
#[derive(Clone)]
pub struct SnapshotRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl SnapshotRepoImpl {
    /// 创建新的快照仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SnapshotRepository for SnapshotRepoImpl {
    async fn create(&self, snapshot: &Snapshot) -> Result<Snapshot, RepositoryError> {
        let model = snapshot::ActiveModel {
            id: Set(snapshot.id),
            target_id: Set(snapshot.target_id),
            page_url: Set(snapshot.page_url.clone()),
            content: Set(snapshot.content.clone()),
            created_at: Set(snapshot.created_at.into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(snapshot.clone())
    }

    async fn find_latest(
        &self,
        target_id: Uuid,
        page_url: &str,
    ) -> Result<Option<Snapshot>, RepositoryError> {
        let model = snapshot::Entity::find()
            .filter(snapshot::Column::TargetId.eq(target_id))
            .filter(snapshot::Column::PageUrl.eq(page_url))
            .order_by_desc(snapshot::Column::CreatedAt)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_last_scanned_at(
        &self,
        target_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let model = snapshot::Entity::find()
            .filter(snapshot::Column::TargetId.eq(target_id))
            .order_by_desc(snapshot::Column::CreatedAt)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(|m| m.created_at.into()))
    }
}

impl From<snapshot::Model> for Snapshot {
    fn from(model: snapshot::Model) -> Self {
        Self {
            id: model.id,
            target_id: model.target_id,
            page_url: model.page_url,
            content: model.content,
            created_at: model.created_at.into(),
        }
    }
}
