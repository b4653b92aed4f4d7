// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::change::Severity;
use crate::domain::services::diff_service::DiffResult;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// 无法解析模型输出时使用的摘要
pub const FALLBACK_SUMMARY: &str = "Could not parse AI summary.";
/// 模型返回空摘要时使用的摘要
pub const MISSING_SUMMARY: &str = "No summary available";
/// 提示中最多包含的新增/删除行数
pub const MAX_PROMPT_LINES: usize = 20;
/// 提示中差异轨迹的最大字符数
pub const MAX_PROMPT_DIFF_CHARS: usize = 3000;

const SYSTEM_PROMPT: &str = "You are a competitive intelligence analyst. \
You review changes detected on competitor web pages and respond only with a single JSON object.";

/// LLM 调用错误
#[derive(Error, Debug)]
pub enum LlmError {
    /// 未配置API密钥
    #[error("LLM API key not configured")]
    MissingApiKey,
    /// 请求发送失败
    #[error("LLM request failed: {0}")]
    Request(String),
    /// 服务端返回非成功状态
    #[error("LLM API returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// 响应格式不符合预期
    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),
}

/// 文本生成客户端特质
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 发送一次补全请求并返回文本回复
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// 变更分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub summary: String,
    pub severity: Severity,
    pub key_changes: Vec<String>,
}

impl Classification {
    /// 中性的兜底结果
    pub fn fallback() -> Self {
        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            severity: Severity::Low,
            key_changes: Vec::new(),
        }
    }
}

/// 分类器输出
///
/// 解析失败不会成为错误，而是 `Fallback`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierOutcome {
    Parsed(Classification),
    Fallback,
}

impl ClassifierOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ClassifierOutcome::Fallback)
    }

    pub fn into_classification(self) -> Classification {
        match self {
            ClassifierOutcome::Parsed(classification) => classification,
            ClassifierOutcome::Fallback => Classification::fallback(),
        }
    }
}

/// 变更分类器特质
#[async_trait]
pub trait ChangeClassifier: Send + Sync {
    /// 为一次显著差异生成摘要、严重度和要点
    async fn classify(&self, target_name: &str, page_url: &str, diff: &DiffResult)
        -> ClassifierOutcome;
}

/// 基于LLM的变更分类器
pub struct LlmChangeClassifier {
    client: Arc<dyn LlmClient>,
}

impl LlmChangeClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChangeClassifier for LlmChangeClassifier {
    async fn classify(
        &self,
        target_name: &str,
        page_url: &str,
        diff: &DiffResult,
    ) -> ClassifierOutcome {
        let prompt = build_prompt(target_name, page_url, diff);

        let reply = match self.client.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Classifier call failed for {}: {}", page_url, e);
                metrics::counter!("classifier_fallbacks_total").increment(1);
                return ClassifierOutcome::Fallback;
            }
        };

        let outcome = parse_response(&reply);
        if outcome.is_fallback() {
            warn!("Classifier returned malformed output for {}", page_url);
            debug!("Malformed classifier reply: {}", reply);
            metrics::counter!("classifier_fallbacks_total").increment(1);
        }
        outcome
    }
}

/// 构建分类提示
///
/// 只包含前 [`MAX_PROMPT_LINES`] 条新增/删除行和前 [`MAX_PROMPT_DIFF_CHARS`] 个字符的差异轨迹
pub fn build_prompt(target_name: &str, page_url: &str, diff: &DiffResult) -> String {
    let raw_diff: String = diff.raw_diff.chars().take(MAX_PROMPT_DIFF_CHARS).collect();

    format!(
        "A change was detected on a competitor's web page.\n\
         \n\
         Competitor: {target_name}\n\
         Page: {page_url}\n\
         Change: {percent}% of content\n\
         \n\
         Added lines:\n{added}\n\
         \n\
         Removed lines:\n{removed}\n\
         \n\
         Raw diff:\n{raw_diff}\n\
         \n\
         Respond with a JSON object of exactly this shape:\n\
         {{\"summary\": \"one or two sentences describing what changed\", \
         \"severity\": \"low|medium|high\", \
         \"keyChanges\": [\"short bullet\", \"...\"]}}\n\
         \n\
         Severity guide:\n\
         - high: pricing changes, product launches, major feature additions or removals\n\
         - medium: messaging or positioning changes, new sections, partnerships\n\
         - low: copy tweaks, layout changes, new blog posts",
        target_name = target_name,
        page_url = page_url,
        percent = diff.change_percent,
        added = format_lines(&diff.added),
        removed = format_lines(&diff.removed),
        raw_diff = raw_diff,
    )
}

fn format_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        return "(none)".to_string();
    }
    lines
        .iter()
        .take(MAX_PROMPT_LINES)
        .map(|line| format!("- {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 解析并校验模型回复
///
/// 容忍Markdown代码块包裹。以下情况返回 `Fallback`：
/// 不是JSON对象、`severity` 不在 low/medium/high 中、`keyChanges` 不是字符串数组
pub fn parse_response(reply: &str) -> ClassifierOutcome {
    let cleaned = strip_code_fence(reply);

    let value: Value = match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(_) => return ClassifierOutcome::Fallback,
    };
    let Some(object) = value.as_object() else {
        return ClassifierOutcome::Fallback;
    };

    let severity = match object
        .get("severity")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Severity>().ok())
    {
        Some(severity) => severity,
        None => return ClassifierOutcome::Fallback,
    };

    let key_changes = match object.get("keyChanges").and_then(Value::as_array) {
        Some(items) => {
            let parsed: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect();
            match parsed {
                Some(parsed) => parsed,
                None => return ClassifierOutcome::Fallback,
            }
        }
        None => return ClassifierOutcome::Fallback,
    };

    let summary = object
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(MISSING_SUMMARY)
        .to_string();

    ClassifierOutcome::Parsed(Classification {
        summary,
        severity,
        key_changes,
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the optional language tag on the opening fence
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
