// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

use crate::m20260101_000001_create_monitoring_tables::{Changes, Snapshots};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Baseline lookup: latest snapshot per (target, page)
        manager
            .create_index(
                Index::create()
                    .name("idx_snapshots_target_page_created")
                    .table(Snapshots::Table)
                    .col(Snapshots::TargetId)
                    .col(Snapshots::PageUrl)
                    .col(Snapshots::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_changes_detected_at")
                    .table(Changes::Table)
                    .col(Changes::DetectedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_changes_detected_at")
                    .table(Changes::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_snapshots_target_page_created")
                    .table(Snapshots::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
