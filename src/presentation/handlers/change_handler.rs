// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, Json};
use std::sync::Arc;

use crate::domain::models::change::ChangeFeedItem;
use crate::domain::repositories::change_repository::ChangeRepository;
use crate::presentation::errors::AppError;

/// 变更动态返回的最大条数
pub const CHANGE_FEED_LIMIT: u64 = 50;

/// 最近的变更记录，按时间倒序
pub async fn list_changes(
    Extension(change_repo): Extension<Arc<dyn ChangeRepository>>,
) -> Result<Json<Vec<ChangeFeedItem>>, AppError> {
    let changes = change_repo.find_recent(CHANGE_FEED_LIMIT).await?;
    Ok(Json(changes))
}
