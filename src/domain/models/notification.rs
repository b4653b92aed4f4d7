// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::change::Severity;
use std::collections::HashMap;

/// 通知设置键名
pub mod keys {
    pub const NOTIFY_MIN_SEVERITY: &str = "notify_min_severity";
    pub const WEBHOOK_ENABLED: &str = "webhook_enabled";
    pub const WEBHOOK_URL: &str = "webhook_url";
    pub const EMAIL_ENABLED: &str = "email_enabled";
    pub const EMAIL_SMTP_HOST: &str = "email_smtp_host";
    pub const EMAIL_SMTP_PORT: &str = "email_smtp_port";
    pub const EMAIL_SMTP_USER: &str = "email_smtp_user";
    pub const EMAIL_SMTP_PASSWORD: &str = "email_smtp_password";
    pub const EMAIL_FROM: &str = "email_from";
    pub const EMAIL_TO: &str = "email_to";
}

/// 未配置时的最低通知严重度
pub const DEFAULT_MIN_SEVERITY: Severity = Severity::High;

/// Webhook 渠道配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookChannel {
    /// 回调URL
    pub url: String,
}

/// SMTP 邮件渠道配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
    /// 收件人，`email_to` 中以逗号分隔
    pub to: Vec<String>,
}

impl SmtpSettings {
    /// 从设置表中读取 SMTP 配置
    ///
    /// 六个字段缺一不可，不接受部分配置
    ///
    /// # 返回值
    ///
    /// * `Ok(SmtpSettings)` - 完整的配置
    /// * `Err(Vec<&str>)` - 缺失或无效的键名
    pub fn from_settings(settings: &HashMap<String, String>) -> Result<Self, Vec<&'static str>> {
        let mut missing = Vec::new();
        let mut field = |key: &'static str| match non_empty(settings, key) {
            Some(value) => value.to_string(),
            None => {
                missing.push(key);
                String::new()
            }
        };

        let host = field(keys::EMAIL_SMTP_HOST);
        let port = field(keys::EMAIL_SMTP_PORT);
        let user = field(keys::EMAIL_SMTP_USER);
        let password = field(keys::EMAIL_SMTP_PASSWORD);
        let from = field(keys::EMAIL_FROM);
        let to = field(keys::EMAIL_TO);

        let port = match port.trim().parse::<u16>() {
            Ok(port) if port > 0 => Some(port),
            _ => None,
        };
        if port.is_none() && !missing.contains(&keys::EMAIL_SMTP_PORT) {
            missing.push(keys::EMAIL_SMTP_PORT);
        }

        let to: Vec<String> = to
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(str::to_string)
            .collect();
        if to.is_empty() && !missing.contains(&keys::EMAIL_TO) {
            missing.push(keys::EMAIL_TO);
        }

        match port {
            Some(port) if missing.is_empty() => Ok(Self {
                host,
                port,
                user,
                password,
                from,
                to,
            }),
            _ => Err(missing),
        }
    }

    /// 465 端口使用隐式TLS，其余端口使用 STARTTLS
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }
}

/// 通知配置
///
/// 每次分发前从设置表重新读取，不做缓存。
/// 渠道只有在启用且必填字段齐全时才为 `Some`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// 最低通知严重度
    pub min_severity: Severity,
    /// Webhook 渠道
    pub webhook: Option<WebhookChannel>,
    /// 邮件渠道
    pub email: Option<SmtpSettings>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            min_severity: DEFAULT_MIN_SEVERITY,
            webhook: None,
            email: None,
        }
    }
}

impl NotificationConfig {
    /// 从设置键值表构建通知配置
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        let min_severity = settings
            .get(keys::NOTIFY_MIN_SEVERITY)
            .and_then(|value| value.trim().parse::<Severity>().ok())
            .unwrap_or(DEFAULT_MIN_SEVERITY);

        let webhook = if is_enabled(settings, keys::WEBHOOK_ENABLED) {
            non_empty(settings, keys::WEBHOOK_URL).map(|url| WebhookChannel {
                url: url.to_string(),
            })
        } else {
            None
        };

        let email = if is_enabled(settings, keys::EMAIL_ENABLED) {
            SmtpSettings::from_settings(settings).ok()
        } else {
            None
        };

        Self {
            min_severity,
            webhook,
            email,
        }
    }

    /// 判断某个严重度是否达到通知阈值
    pub fn should_notify(&self, severity: Severity) -> bool {
        severity.rank() >= self.min_severity.rank()
    }
}

/// 读取非空白的设置值
pub fn non_empty<'a>(settings: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn is_enabled(settings: &HashMap<String, String>, key: &str) -> bool {
    settings.get(key).map(|value| value.trim()) == Some("true")
}
