// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 提供领域层抽象的具体技术实现，依赖于领域层接口而不是反过来。
///
/// 包含的子模块：
/// - 数据库（database）：连接池和实体映射
/// - 指标（metrics）：Prometheus 指标导出
/// - 仓库实现（repositories）：领域仓库接口的SeaORM实现
/// - 服务（services）：LLM 客户端、Webhook 与邮件传输
pub mod database;
pub mod metrics;
pub mod repositories;
pub mod services;
