// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 领域层只依赖这些抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 目标仓库（target_repository）：监控目标的增删查
/// - 快照仓库（snapshot_repository）：页面快照的追加与最新基线查询
/// - 变更仓库（change_repository）：变更记录的追加与变更动态
/// - 设置仓库（settings_repository）：键值设置表
pub mod change_repository;
pub mod settings_repository;
pub mod snapshot_repository;
pub mod target_repository;

pub use target_repository::RepositoryError;
