// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::LlmSettings;
use crate::domain::services::classifier_service::{LlmClient, LlmError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Anthropic 消息接口版本
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic 消息接口客户端
///
/// # 配置
///
/// - `llm.api_key` - API密钥，未配置时读取 `ANTHROPIC_API_KEY`
/// - `llm.model` - 模型名称
/// - `llm.api_base_url` - API基础URL
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_key: settings.resolved_api_key(),
            model: settings.model.clone(),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            max_tokens: settings.max_tokens,
        })
    }

    /// 是否已配置API密钥
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    /// 调用消息接口并返回第一个文本块
    ///
    /// # 错误
    ///
    /// * 未配置API密钥
    /// * 请求失败或返回非成功状态
    /// * 响应中没有文本块
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;

        let request_body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let url = format!("{}/messages", self.api_base_url);
        let response = self
            .client
            .post(url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        body.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| LlmError::InvalidResponse("no text content block".into()))
    }
}
