// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::target_request::CreateTargetDto;
use crate::application::dto::target_response::{TargetDetailDto, TargetSummaryDto};
use crate::domain::models::target::Target;
use crate::domain::repositories::change_repository::ChangeRepository;
use crate::domain::repositories::snapshot_repository::SnapshotRepository;
use crate::domain::repositories::target_repository::TargetRepository;
use crate::domain::repositories::RepositoryError;
use crate::presentation::errors::AppError;

/// 列出全部监控目标，附带最近扫描时间
pub async fn list_targets(
    Extension(target_repo): Extension<Arc<dyn TargetRepository>>,
    Extension(snapshot_repo): Extension<Arc<dyn SnapshotRepository>>,
) -> Result<Json<Vec<TargetSummaryDto>>, AppError> {
    let targets = target_repo.list().await?;

    let mut summaries = Vec::with_capacity(targets.len());
    for target in targets {
        let last_scanned_at = snapshot_repo.find_last_scanned_at(target.id).await?;
        summaries.push(TargetSummaryDto {
            target,
            last_scanned_at,
        });
    }

    Ok(Json(summaries))
}

/// 创建监控目标
///
/// # 返回值
///
/// * `201` - 创建成功，返回目标
/// * `400` - 名称、URL或页面列表无效
pub async fn create_target(
    Extension(target_repo): Extension<Arc<dyn TargetRepository>>,
    Json(payload): Json<CreateTargetDto>,
) -> Result<(StatusCode, Json<Target>), AppError> {
    payload.validate()?;

    let target = target_repo.create(&payload.into_target()).await?;
    info!("Created target {} ({})", target.name, target.id);
    Ok((StatusCode::CREATED, Json(target)))
}

/// 获取目标详情，包含该目标的全部变更记录
pub async fn get_target(
    Extension(target_repo): Extension<Arc<dyn TargetRepository>>,
    Extension(snapshot_repo): Extension<Arc<dyn SnapshotRepository>>,
    Extension(change_repo): Extension<Arc<dyn ChangeRepository>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TargetDetailDto>, AppError> {
    let target = target_repo
        .find_by_id(id)
        .await?
        .ok_or(RepositoryError::NotFound)?;
    let last_scanned_at = snapshot_repo.find_last_scanned_at(id).await?;
    let changes = change_repo.find_by_target(id).await?;

    Ok(Json(TargetDetailDto {
        target,
        last_scanned_at,
        changes,
    }))
}

/// 删除目标及其快照和变更
pub async fn delete_target(
    Extension(target_repo): Extension<Arc<dyn TargetRepository>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !target_repo.delete(id).await? {
        return Err(RepositoryError::NotFound.into());
    }

    info!("Deleted target {}", id);
    Ok(Json(json!({ "success": true })))
}
