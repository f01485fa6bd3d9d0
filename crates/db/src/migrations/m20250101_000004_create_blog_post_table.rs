//! Create blog post table.

use sea_orm_migration::prelude::*;

use super::{content_columns, content_indexes};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table.table(BlogPost::Table).if_not_exists();
        content_columns(&mut table, "blog_post");
        table
            .col(ColumnDef::new(BlogPost::Excerpt).text())
            .col(ColumnDef::new(BlogPost::Body).text().not_null())
            .col(ColumnDef::new(BlogPost::CoverImageUrl).string_len(512))
            .col(
                ColumnDef::new(BlogPost::ReadMinutes)
                    .integer()
                    .not_null()
                    .default(1),
            );

        manager.create_table(table).await?;

        content_indexes(manager, "blog_post").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlogPost::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BlogPost {
    Table,
    Excerpt,
    Body,
    CoverImageUrl,
    ReadMinutes,
}
