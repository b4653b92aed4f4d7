// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, Json};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::repositories::settings_repository::SettingsRepository;
use crate::domain::services::notification_service::NotificationDispatcher;
use crate::presentation::errors::AppError;

/// 读取全部设置
pub async fn get_settings(
    Extension(settings_repo): Extension<Arc<dyn SettingsRepository>>,
) -> Result<Json<HashMap<String, String>>, AppError> {
    Ok(Json(settings_repo.load_all().await?))
}

/// 批量写入设置
pub async fn update_settings(
    Extension(settings_repo): Extension<Arc<dyn SettingsRepository>>,
    Json(values): Json<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    settings_repo.upsert_many(&values).await?;
    info!("Updated {} setting(s)", values.len());
    Ok(Json(json!({ "ok": true })))
}

/// 发送测试 webhook
pub async fn test_webhook(
    Extension(dispatcher): Extension<Arc<NotificationDispatcher>>,
) -> Result<Json<Value>, AppError> {
    dispatcher.send_test_webhook().await?;
    Ok(Json(json!({ "ok": true })))
}

/// 发送测试邮件
pub async fn test_email(
    Extension(dispatcher): Extension<Arc<NotificationDispatcher>>,
) -> Result<Json<Value>, AppError> {
    dispatcher.send_test_email().await?;
    Ok(Json(json!({ "ok": true })))
}
