//! Create short-form video table.

use sea_orm_migration::prelude::*;

use super::{content_columns, content_indexes};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table.table(Short::Table).if_not_exists();
        content_columns(&mut table, "short");
        table
            .col(ColumnDef::new(Short::MediaUrl).string_len(512).not_null())
            .col(ColumnDef::new(Short::ThumbnailUrl).string_len(512))
            .col(ColumnDef::new(Short::DurationSeconds).integer());

        manager.create_table(table).await?;

        content_indexes(manager, "short").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Short::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Short {
    Table,
    MediaUrl,
    ThumbnailUrl,
    DurationSeconds,
}
