// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 监控目标、快照与变更表迁移
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    /// 应用数据库迁移
    ///
    /// # 参数
    ///
    /// * `manager` - 数据库模式管理器
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 迁移成功
    /// * `Err(DbErr)` - 迁移失败
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Create targets table (No dependencies)
        manager
            .create_table(
                Table::create()
                    .table(Targets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Targets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Targets::Name).string().not_null())
                    .col(ColumnDef::new(Targets::Url).string().not_null())
                    // JSON array of page URLs, kept as raw text so malformed rows stay readable
                    .col(ColumnDef::new(Targets::Pages).text().not_null())
                    .col(
                        ColumnDef::new(Targets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. Create snapshots table (Depends on Targets)
        manager
            .create_table(
                Table::create()
                    .table(Snapshots::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Snapshots::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Snapshots::TargetId).uuid().not_null())
                    .col(ColumnDef::new(Snapshots::PageUrl).string().not_null())
                    .col(ColumnDef::new(Snapshots::Content).text().not_null())
                    .col(
                        ColumnDef::new(Snapshots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_snapshots_target")
                            .from(Snapshots::Table, Snapshots::TargetId)
                            .to(Targets::Table, Targets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 3. Create changes table (Depends on Snapshots)
        manager
            .create_table(
                Table::create()
                    .table(Changes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Changes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Changes::SnapshotId).uuid().not_null())
                    .col(ColumnDef::new(Changes::PageUrl).string().not_null())
                    .col(ColumnDef::new(Changes::Diff).text().not_null())
                    .col(ColumnDef::new(Changes::Summary).text().not_null())
                    .col(ColumnDef::new(Changes::Severity).string().not_null())
                    .col(
                        ColumnDef::new(Changes::DetectedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_changes_snapshot")
                            .from(Changes::Table, Changes::SnapshotId)
                            .to(Snapshots::Table, Snapshots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    /// 回滚数据库迁移
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Changes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Snapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Targets::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Targets {
    Table,
    Id,
    Name,
    Url,
    Pages,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Snapshots {
    Table,
    Id,
    TargetId,
    PageUrl,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Changes {
    Table,
    Id,
    SnapshotId,
    PageUrl,
    Diff,
    Summary,
    Severity,
    DetectedAt,
}
