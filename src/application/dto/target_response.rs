// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::change::ChangeRecord;
use crate::domain::models::target::Target;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 目标列表项，附带最近一次扫描时间
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSummaryDto {
    #[serde(flatten)]
    pub target: Target,
    pub last_scanned_at: Option<DateTime<Utc>>,
}

/// 目标详情，附带该目标的全部变更
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDetailDto {
    #[serde(flatten)]
    pub target: Target,
    pub last_scanned_at: Option<DateTime<Utc>>,
    pub changes: Vec<ChangeRecord>,
}
