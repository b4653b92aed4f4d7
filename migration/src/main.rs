// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 迁移命令行入口
///
/// 例如 `DATABASE_URL=sqlite://compwatch.db?mode=rwc cargo run -p migration -- up`
/// 创建监控目标、快照、变更和设置表
#[async_std::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
