// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, Json};
use std::sync::Arc;

use crate::application::dto::scan_request::ScanRequestDto;
use crate::domain::models::scan::{ScanAllResponse, ScanTargetResponse};
use crate::domain::services::scan_service::ScanService;
use crate::presentation::errors::{AppError, RequestError};

/// 立即扫描单个目标
///
/// 请求体 `{"targetId": "..."}`，也接受 `competitorId`
pub async fn scan_target(
    Extension(scan_service): Extension<Arc<ScanService>>,
    Json(payload): Json<ScanRequestDto>,
) -> Result<Json<ScanTargetResponse>, AppError> {
    let target_id = payload
        .parse_target_id()
        .map_err(|msg| RequestError::BadRequest(msg.to_string()))?;

    let response = scan_service.scan_target(target_id).await?;
    Ok(Json(response))
}

/// 立即扫描全部目标
pub async fn scan_all(
    Extension(scan_service): Extension<Arc<ScanService>>,
) -> Result<Json<ScanAllResponse>, AppError> {
    let response = scan_service.scan_all().await?;
    Ok(Json(response))
}
