// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施服务模块
///
/// - Anthropic 消息接口客户端（anthropic_client）
/// - Webhook 传输（webhook_transport）
/// - SMTP 邮件传输（email_transport）
pub mod anthropic_client;
pub mod email_transport;
pub mod webhook_transport;
