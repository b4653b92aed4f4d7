// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::notification_service::{NotificationError, WebhookTransport};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Webhook 传输实现
pub struct ReqwestWebhookTransport {
    /// HTTP 客户端
    client: reqwest::Client,
}

/// Webhook 请求默认超时
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

impl ReqwestWebhookTransport {
    /// 创建新的 Webhook 传输
    pub fn new(timeout: Duration) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for ReqwestWebhookTransport {
    async fn post_json(&self, url: &str, payload: &Value) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(NotificationError::Status { status, body })
        }
    }
}
