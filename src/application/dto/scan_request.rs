// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 扫描单个目标请求
///
/// 兼容旧字段名 `competitorId`
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequestDto {
    #[serde(default, alias = "competitorId")]
    pub target_id: Option<String>,
}

impl ScanRequestDto {
    /// 解析目标ID
    ///
    /// # 返回值
    ///
    /// * `Ok(Uuid)` - 目标ID
    /// * `Err(&str)` - 缺失或格式错误时的提示信息
    pub fn parse_target_id(&self) -> Result<Uuid, &'static str> {
        let raw = self
            .target_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or("targetId is required")?;

        Uuid::parse_str(raw).map_err(|_| "targetId must be a UUID")
    }
}
