// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 监控目标（target）：被监控的实体及其页面列表
/// - 快照（snapshot）：某一页面在某一时刻的正文
/// - 变更（change）：两次相邻快照之间经过分类的显著差异
/// - 通知配置（notification）：严重度阈值与各渠道配置
/// - 扫描结果（scan）：每次扫描返回给调用方的结构
pub mod change;
pub mod notification;
pub mod scan;
pub mod snapshot;
pub mod target;
