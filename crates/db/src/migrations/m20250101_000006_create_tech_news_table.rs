//! Create tech news table.

use sea_orm_migration::prelude::*;

use super::{content_columns, content_indexes};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table.table(TechNews::Table).if_not_exists();
        content_columns(&mut table, "tech_news");
        table
            .col(ColumnDef::new(TechNews::Summary).text())
            .col(ColumnDef::new(TechNews::Body).text().not_null())
            .col(ColumnDef::new(TechNews::SourceName).string_len(256))
            .col(ColumnDef::new(TechNews::SourceUrl).string_len(512))
            .col(ColumnDef::new(TechNews::ImageUrl).string_len(512))
            .col(ColumnDef::new(TechNews::Category).string_len(64));

        manager.create_table(table).await?;

        content_indexes(manager, "tech_news").await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tech_news_category")
                    .table(TechNews::Table)
                    .col(TechNews::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TechNews::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TechNews {
    Table,
    Summary,
    Body,
    SourceName,
    SourceUrl,
    ImageUrl,
    Category,
}
