// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::change::{ChangeRecord, Severity};
use crate::domain::models::notification::{keys, non_empty, NotificationConfig, SmtpSettings};
use crate::domain::models::target::Target;
use crate::domain::repositories::settings_repository::SettingsRepository;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// 通知页脚与发送方名称
pub const BRAND: &str = "CompetitorWatch";
/// 测试通知使用的绿色
const TEST_COLOR: &str = "#48bb78";

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 渠道未配置
    #[error("{0}")]
    NotConfigured(String),
    /// 请求发送失败
    #[error("Webhook request failed: {0}")]
    Request(String),
    /// 对端返回非成功状态
    #[error("Webhook responded with {status}: {body}")]
    Status { status: u16, body: String },
    /// SMTP 发送失败
    #[error("SMTP error: {0}")]
    Smtp(String),
    /// 邮件地址无效
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    /// 读取设置失败
    #[error("Failed to load notification settings: {0}")]
    Settings(#[from] RepositoryError),
}

/// Webhook 传输特质
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// 以JSON形式POST负载，非2xx响应视为失败
    async fn post_json(&self, url: &str, payload: &Value) -> Result<(), NotificationError>;
}

/// 待发送的邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
}

/// 邮件传输特质
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// 通过给定的SMTP配置发送邮件
    async fn send(&self, smtp: &SmtpSettings, message: &EmailMessage)
        -> Result<(), NotificationError>;
}

/// 单个渠道的发送结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// 未启用或配置不完整
    NotConfigured,
    Sent,
    Failed(String),
}

/// 一次分发的结果，仅用于日志与测试，不影响扫描结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReport {
    /// 读取设置失败，放弃分发
    SettingsUnavailable,
    /// 严重度低于阈值
    BelowThreshold,
    /// 各渠道已分别尝试
    Attempted {
        webhook: ChannelOutcome,
        email: ChannelOutcome,
    },
}

/// 变更通知特质
///
/// 实现方必须吸收所有渠道错误
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn dispatch(&self, change: &ChangeRecord, target: &Target) -> DispatchReport;
}

/// 通知分发器
///
/// 每次分发都重新读取通知配置，按严重度阈值过滤，再分别尝试 webhook 和邮件渠道。
/// 一个渠道失败不会影响另一个渠道，也不会传播给调用方。
pub struct NotificationDispatcher {
    settings_repo: Arc<dyn SettingsRepository>,
    webhook: Arc<dyn WebhookTransport>,
    email: Arc<dyn EmailTransport>,
}

impl NotificationDispatcher {
    /// 创建新的通知分发器
    ///
    /// # 参数
    ///
    /// * `settings_repo` - 设置仓库
    /// * `webhook` - Webhook 传输
    /// * `email` - 邮件传输
    pub fn new(
        settings_repo: Arc<dyn SettingsRepository>,
        webhook: Arc<dyn WebhookTransport>,
        email: Arc<dyn EmailTransport>,
    ) -> Self {
        Self {
            settings_repo,
            webhook,
            email,
        }
    }

    /// 向已配置的 webhook 发送测试通知
    ///
    /// 只要求存在 `webhook_url`，忽略启用开关
    pub async fn send_test_webhook(&self) -> Result<(), NotificationError> {
        let settings = self.settings_repo.load_all().await?;
        let url = non_empty(&settings, keys::WEBHOOK_URL)
            .ok_or_else(|| NotificationError::NotConfigured("No webhook URL configured".into()))?;

        let payload = build_test_payload(Utc::now().timestamp());
        self.webhook.post_json(url, &payload).await?;
        info!("Test webhook delivered");
        Ok(())
    }

    /// 发送测试邮件
    ///
    /// 六个SMTP字段必须全部配置，忽略启用开关
    pub async fn send_test_email(&self) -> Result<(), NotificationError> {
        let settings = self.settings_repo.load_all().await?;
        let smtp = SmtpSettings::from_settings(&settings).map_err(|missing| {
            NotificationError::NotConfigured(format!(
                "All SMTP fields (host, port, user, password, from, to) must be configured; missing or invalid: {}",
                missing.join(", ")
            ))
        })?;

        self.email.send(&smtp, &build_test_email()).await?;
        info!("Test email delivered to {} recipient(s)", smtp.to.len());
        Ok(())
    }

    async fn send_webhook(&self, url: &str, change: &ChangeRecord, target: &Target) -> ChannelOutcome {
        let payload = build_change_payload(change, target, Utc::now().timestamp());
        match self.webhook.post_json(url, &payload).await {
            Ok(()) => {
                info!("Webhook sent for change {}", change.id);
                metrics::counter!("notifications_sent_total", "channel" => "webhook").increment(1);
                ChannelOutcome::Sent
            }
            Err(e) => {
                error!("Webhook delivery failed for change {}: {}", change.id, e);
                metrics::counter!("notifications_failed_total", "channel" => "webhook")
                    .increment(1);
                ChannelOutcome::Failed(e.to_string())
            }
        }
    }

    async fn send_email(
        &self,
        smtp: &SmtpSettings,
        change: &ChangeRecord,
        target: &Target,
    ) -> ChannelOutcome {
        let message = build_change_email(change, target);
        match self.email.send(smtp, &message).await {
            Ok(()) => {
                info!("Email sent for change {}", change.id);
                metrics::counter!("notifications_sent_total", "channel" => "email").increment(1);
                ChannelOutcome::Sent
            }
            Err(e) => {
                error!("Email delivery failed for change {}: {}", change.id, e);
                metrics::counter!("notifications_failed_total", "channel" => "email").increment(1);
                ChannelOutcome::Failed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl ChangeNotifier for NotificationDispatcher {
    async fn dispatch(&self, change: &ChangeRecord, target: &Target) -> DispatchReport {
        let settings = match self.settings_repo.load_all().await {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load notification settings: {}", e);
                return DispatchReport::SettingsUnavailable;
            }
        };

        let config = NotificationConfig::from_settings(&settings);
        if !config.should_notify(change.severity) {
            info!(
                "Change {} severity {} below notification threshold {}",
                change.id, change.severity, config.min_severity
            );
            return DispatchReport::BelowThreshold;
        }

        let webhook = match &config.webhook {
            Some(channel) => self.send_webhook(&channel.url, change, target).await,
            None => ChannelOutcome::NotConfigured,
        };

        let email = match &config.email {
            Some(smtp) => self.send_email(smtp, change, target).await,
            None => ChannelOutcome::NotConfigured,
        };

        if webhook == ChannelOutcome::NotConfigured && email == ChannelOutcome::NotConfigured {
            warn!("No notification channel configured for change {}", change.id);
        }

        DispatchReport::Attempted { webhook, email }
    }
}

/// 构建变更通知的 webhook 负载（Slack 兼容格式）
pub fn build_change_payload(change: &ChangeRecord, target: &Target, ts: i64) -> Value {
    let severity = change.severity;
    json!({
        "text": format!(
            "{} *[{}]* — {} severity change detected",
            severity.emoji(),
            target.name,
            severity.label()
        ),
        "attachments": [{
            "color": severity.color(),
            "title": format!("Page changed: {}", change.page_url),
            "title_link": change.page_url,
            "text": change.summary,
            "fields": [
                { "title": "Competitor", "value": target.name, "short": true },
                {
                    "title": "Severity",
                    "value": format!("{} {}", severity.emoji(), severity.label()),
                    "short": true
                },
            ],
            "footer": BRAND,
            "ts": ts,
        }],
    })
}

/// 构建测试通知的 webhook 负载
pub fn build_test_payload(ts: i64) -> Value {
    json!({
        "text": format!("{} *[{}]* — Test notification", Severity::Low.emoji(), BRAND),
        "attachments": [{
            "color": TEST_COLOR,
            "title": "Test Notification",
            "text": format!(
                "This is a test notification from {}. If you see this, your webhook is configured correctly.",
                BRAND
            ),
            "fields": [
                { "title": "Status", "value": "🟢 Success", "short": true },
                { "title": "Source", "value": "Settings → Test", "short": true },
            ],
            "footer": BRAND,
            "ts": ts,
        }],
    })
}

/// 构建变更通知邮件
///
/// 所有插入的文本都经过HTML转义
pub fn build_change_email(change: &ChangeRecord, target: &Target) -> EmailMessage {
    let severity = change.severity;
    let color = severity.color();
    let badge = format!("{} {}", severity.emoji(), severity.label());
    let name = encode_text(&target.name);
    let page_text = encode_text(&change.page_url);
    let page_href = encode_double_quoted_attribute(&change.page_url);
    let summary = encode_text(&change.summary);

    let html_body = format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #1a202c;">{brand} Alert</h2>
  <div style="background: {color}; color: white; display: inline-block; padding: 4px 12px; border-radius: 4px; font-weight: bold; margin-bottom: 16px;">{badge} Severity</div>
  <h3 style="color: #2d3748;">{name}</h3>
  <p style="color: #4a5568;">A change was detected on one of their monitored pages.</p>
  <table style="border-collapse: collapse; width: 100%; margin-bottom: 16px;">
    <tr>
      <td style="padding: 8px; border: 1px solid #e2e8f0; font-weight: bold; background: #f7fafc;">Page</td>
      <td style="padding: 8px; border: 1px solid #e2e8f0;"><a href="{page_href}">{page_text}</a></td>
    </tr>
    <tr>
      <td style="padding: 8px; border: 1px solid #e2e8f0; font-weight: bold; background: #f7fafc;">Severity</td>
      <td style="padding: 8px; border: 1px solid #e2e8f0;">{badge}</td>
    </tr>
  </table>
  <h4 style="color: #2d3748;">AI Summary</h4>
  <div style="background: #f7fafc; border-left: 4px solid {color}; padding: 12px 16px; color: #4a5568;">{summary}</div>
  <p style="color: #a0aec0; font-size: 12px; margin-top: 24px;">Sent by {brand}</p>
</div>"#,
        brand = BRAND,
        color = color,
        badge = badge,
        name = name,
        page_href = page_href,
        page_text = page_text,
        summary = summary,
    );

    EmailMessage {
        subject: format!(
            "{} [{}] {} severity change detected",
            severity.emoji(),
            target.name,
            severity.label()
        ),
        html_body,
    }
}

/// 构建测试邮件
pub fn build_test_email() -> EmailMessage {
    let html_body = format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #1a202c;">{brand} — Test Email</h2>
  <div style="background: {color}; color: white; display: inline-block; padding: 4px 12px; border-radius: 4px; font-weight: bold; margin-bottom: 16px;">🟢 Success</div>
  <p style="color: #4a5568;">This is a test email from {brand}. If you received this, your email notifications are configured correctly.</p>
  <p style="color: #a0aec0; font-size: 12px; margin-top: 24px;">Sent by {brand}</p>
</div>"#,
        brand = BRAND,
        color = TEST_COLOR,
    );

    EmailMessage {
        subject: format!("🟢 {} — Test Email", BRAND),
        html_body,
    }
}
