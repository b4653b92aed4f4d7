// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 基于SeaORM的领域仓库接口实现
pub mod change_repo_impl;
pub mod settings_repo_impl;
pub mod snapshot_repo_impl;
pub mod target_repo_impl;
