// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::change::{ChangeFeedItem, ChangeRecord, Severity};
use crate::domain::repositories::change_repository::ChangeRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{change, snapshot, target};
use async_trait::async_trait;
use sea_orm::*;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// 变更记录仓库实现
#[derive(Clone)]
pub struct ChangeRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl ChangeRepoImpl {
    /// 创建新的变更仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChangeRepository for ChangeRepoImpl {
    async fn create(&self, record: &ChangeRecord) -> Result<ChangeRecord, RepositoryError> {
        let model = change::ActiveModel {
            id: Set(record.id),
            snapshot_id: Set(record.snapshot_id),
            page_url: Set(record.page_url.clone()),
            diff: Set(record.diff.clone()),
            summary: Set(record.summary.clone()),
            severity: Set(record.severity.as_str().to_string()),
            detected_at: Set(record.detected_at.into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(record.clone())
    }

    async fn find_recent(&self, limit: u64) -> Result<Vec<ChangeFeedItem>, RepositoryError> {
        let rows = change::Entity::find()
            .find_also_related(snapshot::Entity)
            .order_by_desc(change::Column::DetectedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        let target_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, snapshot)| snapshot.as_ref().map(|s| s.target_id))
            .collect();

        let targets: HashMap<Uuid, target::Model> = if target_ids.is_empty() {
            HashMap::new()
        } else {
            target::Entity::find()
                .filter(target::Column::Id.is_in(target_ids))
                .all(self.db.as_ref())
                .await?
                .into_iter()
                .map(|t| (t.id, t))
                .collect()
        };

        let mut items = Vec::with_capacity(rows.len());
        for (change_model, snapshot_model) in rows {
            let Some(target_model) = snapshot_model.and_then(|s| targets.get(&s.target_id))
            else {
                continue;
            };
            items.push(ChangeFeedItem {
                change: change_model.try_into()?,
                target_id: target_model.id,
                target_name: target_model.name.clone(),
                target_url: target_model.url.clone(),
            });
        }

        Ok(items)
    }

    async fn find_by_target(&self, target_id: Uuid) -> Result<Vec<ChangeRecord>, RepositoryError> {
        let models = change::Entity::find()
            .inner_join(snapshot::Entity)
            .filter(snapshot::Column::TargetId.eq(target_id))
            .order_by_desc(change::Column::DetectedAt)
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(TryInto::try_into).collect()
    }
}

impl TryFrom<change::Model> for ChangeRecord {
    type Error = RepositoryError;

    fn try_from(model: change::Model) -> Result<Self, Self::Error> {
        let severity = model
            .severity
            .parse::<Severity>()
            .map_err(|e| RepositoryError::Database(DbErr::Custom(e.to_string())))?;

        Ok(Self {
            id: model.id,
            snapshot_id: model.snapshot_id,
            page_url: model.page_url,
            diff: model.diff,
            summary: model.summary,
            severity,
            detected_at: model.detected_at.into(),
        })
    }
}
