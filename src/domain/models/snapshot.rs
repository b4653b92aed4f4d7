// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 页面快照实体
///
/// 某个目标的某个页面在某一时刻提取出的正文。
/// 同一 (目标, 页面) 的快照按创建时间全序排列，最新的一条是下一次扫描的比较基线。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// 快照唯一标识符
    pub id: Uuid,
    /// 所属目标ID
    pub target_id: Uuid,
    /// 页面URL
    pub page_url: String,
    /// 提取出的正文
    pub content: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    /// 创建一个新的快照
    pub fn new(target_id: Uuid, page_url: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_id,
            page_url,
            content,
            created_at: Utc::now(),
        }
    }
}
