//! Create PDF document table (ebooks, infographics, white papers).

use sea_orm_migration::prelude::*;

use super::{content_columns, content_indexes};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table.table(PdfDocument::Table).if_not_exists();
        content_columns(&mut table, "pdf_document");
        table
            .col(ColumnDef::new(PdfDocument::Category).string_len(16).not_null())
            .col(ColumnDef::new(PdfDocument::Description).text())
            .col(ColumnDef::new(PdfDocument::FileUrl).string_len(512).not_null())
            .col(ColumnDef::new(PdfDocument::ThumbnailUrl).string_len(512))
            .col(ColumnDef::new(PdfDocument::PageCount).integer())
            .col(
                ColumnDef::new(PdfDocument::DownloadsCount)
                    .big_integer()
                    .not_null()
                    .default(0),
            );

        manager.create_table(table).await?;

        content_indexes(manager, "pdf_document").await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pdf_document_category")
                    .table(PdfDocument::Table)
                    .col(PdfDocument::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PdfDocument::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PdfDocument {
    Table,
    Category,
    Description,
    FileUrl,
    ThumbnailUrl,
    PageCount,
    DownloadsCount,
}
