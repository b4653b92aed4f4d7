// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 持久化差异摘录的最大字符数
pub const MAX_DIFF_EXCERPT_CHARS: usize = 10_000;

/// 变更严重度
///
/// 阈值比较时按 `low < medium < high` 排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// 阈值比较使用的等级
    pub fn rank(self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// 首字母大写的标签，用于通知文案
    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Severity::Low => "🟢",
            Severity::Medium => "🟡",
            Severity::High => "🔴",
        }
    }

    /// 通知使用的十六进制颜色
    pub fn color(self) -> &'static str {
        match self {
            Severity::Low => "#48bb78",
            Severity::Medium => "#ed8936",
            Severity::High => "#e53e3e",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无法识别的严重度字符串
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeverity(pub String);

impl fmt::Display for UnknownSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown severity '{}'", self.0)
    }
}

impl std::error::Error for UnknownSeverity {}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}

/// 变更记录实体
///
/// 属于触发它的那一条（较新的）快照。只有当快照存在前驱且差异显著时才会创建。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    /// 变更唯一标识符
    pub id: Uuid,
    /// 所属（新）快照ID
    pub snapshot_id: Uuid,
    /// 页面URL
    pub page_url: String,
    /// 截断后的差异摘录
    pub diff: String,
    /// 变更摘要
    pub summary: String,
    /// 严重度
    pub severity: Severity,
    /// 检测时间
    pub detected_at: DateTime<Utc>,
}

impl ChangeRecord {
    /// 创建一个新的变更记录
    ///
    /// 差异摘录超过 [`MAX_DIFF_EXCERPT_CHARS`] 个字符时被截断
    ///
    /// # 参数
    ///
    /// * `snapshot_id` - 新快照ID
    /// * `page_url` - 页面URL
    /// * `raw_diff` - 完整差异文本
    /// * `summary` - 变更摘要
    /// * `severity` - 严重度
    pub fn new(
        snapshot_id: Uuid,
        page_url: String,
        raw_diff: &str,
        summary: String,
        severity: Severity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            snapshot_id,
            page_url,
            diff: truncate_chars(raw_diff, MAX_DIFF_EXCERPT_CHARS),
            summary,
            severity,
            detected_at: Utc::now(),
        }
    }
}

/// 变更动态条目
///
/// 最近变更列表中的一项，附带所属目标的基本信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeFeedItem {
    #[serde(flatten)]
    pub change: ChangeRecord,
    pub target_id: Uuid,
    pub target_name: String,
    pub target_url: String,
}

/// 按字符（而非字节）截断字符串
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
