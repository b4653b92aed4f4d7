// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification::SmtpSettings;
use crate::domain::services::notification_service::{
    EmailMessage, EmailTransport, NotificationError,
};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::debug;

/// SMTP 邮件传输实现
///
/// 每次发送都按当前设置新建连接，设置修改后立即生效
pub struct LettreEmailTransport {
    timeout: Duration,
}

impl Default for LettreEmailTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl LettreEmailTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// 构建HTML邮件
///
/// # 错误
///
/// 发件人或任一收件人地址无效时返回 `InvalidAddress`
pub fn build_message(
    smtp: &SmtpSettings,
    message: &EmailMessage,
) -> Result<Message, NotificationError> {
    let from: Mailbox = smtp
        .from
        .parse()
        .map_err(|_| NotificationError::InvalidAddress(smtp.from.clone()))?;

    let mut builder = Message::builder()
        .from(from)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_HTML);

    for recipient in &smtp.to {
        let mailbox: Mailbox = recipient
            .parse()
            .map_err(|_| NotificationError::InvalidAddress(recipient.clone()))?;
        builder = builder.to(mailbox);
    }

    builder
        .body(message.html_body.clone())
        .map_err(|e| NotificationError::Smtp(e.to_string()))
}

#[async_trait]
impl EmailTransport for LettreEmailTransport {
    async fn send(
        &self,
        smtp: &SmtpSettings,
        message: &EmailMessage,
    ) -> Result<(), NotificationError> {
        let email = build_message(smtp, message)?;

        // Port 465 speaks TLS from the first byte, everything else upgrades via STARTTLS
        let builder = if smtp.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
        }
        .map_err(|e| NotificationError::Smtp(e.to_string()))?;

        let mailer = builder
            .port(smtp.port)
            .credentials(Credentials::new(smtp.user.clone(), smtp.password.clone()))
            .timeout(Some(self.timeout))
            .build();

        let response = mailer
            .send(email)
            .await
            .map_err(|e| NotificationError::Smtp(e.to_string()))?;
        debug!("SMTP server accepted message: {:?}", response.code());
        Ok(())
    }
}
