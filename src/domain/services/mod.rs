// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 差异服务（diff_service）：行级差异与显著性判断
/// - 分类服务（classifier_service）：调用LLM生成摘要与严重度，解析失败时降级
/// - 通知服务（notification_service）：按严重度阈值向 webhook / 邮件渠道分发
/// - 扫描服务（scan_service）：编排抓取、差异、分类、持久化与通知
pub mod classifier_service;
pub mod diff_service;
pub mod notification_service;
pub mod scan_service;
