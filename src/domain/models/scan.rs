// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 目标页面列表损坏时的错误信息
pub const MALFORMED_PAGES_MESSAGE: &str = "malformed pages data";

/// 单个页面的扫描状态
///
/// 对外序列化为 `first_scan`、`no_change`、`change_detected` 或 `error: <message>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    /// 首次抓取，没有可比较的基线
    FirstScan,
    /// 差异不显著
    NoChange,
    /// 检测到显著变更
    ChangeDetected,
    /// 页面级错误
    Error(String),
}

impl PageStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, PageStatus::Error(_))
    }

    /// 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            PageStatus::FirstScan => "first_scan",
            PageStatus::NoChange => "no_change",
            PageStatus::ChangeDetected => "change_detected",
            PageStatus::Error(_) => "error",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageStatus::Error(message) => write!(f, "error: {}", message),
            other => f.write_str(other.label()),
        }
    }
}

impl Serialize for PageStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PageStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatusVisitor;

        impl Visitor<'_> for StatusVisitor {
            type Value = PageStatus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a page scan status string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                match value {
                    "first_scan" => Ok(PageStatus::FirstScan),
                    "no_change" => Ok(PageStatus::NoChange),
                    "change_detected" => Ok(PageStatus::ChangeDetected),
                    other => other
                        .strip_prefix("error: ")
                        .map(|message| PageStatus::Error(message.to_string()))
                        .ok_or_else(|| E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_str(StatusVisitor)
    }
}

/// 单个页面的扫描结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageScanResult {
    pub page_url: String,
    pub status: PageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_detected: Option<bool>,
}

impl PageScanResult {
    /// 根据状态构建结果，`changeDetected` 只在变更时出现
    pub fn new(page_url: impl Into<String>, status: PageStatus) -> Self {
        let change_detected = (status == PageStatus::ChangeDetected).then_some(true);
        Self {
            page_url: page_url.into(),
            status,
            change_detected,
        }
    }

    pub fn error(page_url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(page_url, PageStatus::Error(message.into()))
    }
}

/// 单个目标的扫描结果（扫描全部时的一项）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetScanResult {
    pub target_id: Uuid,
    pub target_name: String,
    pub pages: Vec<PageScanResult>,
}

/// 扫描单个目标的响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanTargetResponse {
    pub target_id: Uuid,
    pub results: Vec<PageScanResult>,
}

/// 扫描全部目标的响应
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanAllResponse {
    pub results: Vec<TargetScanResult>,
}

impl ScanAllResponse {
    /// 所有目标的页面结果总数
    pub fn page_count(&self) -> usize {
        self.results.iter().map(|target| target.pages.len()).sum()
    }

    /// 处于错误状态的页面结果数
    pub fn error_count(&self) -> usize {
        self.results
            .iter()
            .flat_map(|target| target.pages.iter())
            .filter(|page| page.status.is_error())
            .count()
    }
}
