//! Create case study table.

use sea_orm_migration::prelude::*;

use super::{content_columns, content_indexes};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table.table(CaseStudy::Table).if_not_exists();
        content_columns(&mut table, "case_study");
        table
            .col(ColumnDef::new(CaseStudy::ClientName).string_len(256))
            .col(ColumnDef::new(CaseStudy::Industry).string_len(128))
            .col(ColumnDef::new(CaseStudy::Summary).text())
            .col(ColumnDef::new(CaseStudy::Body).text().not_null())
            .col(ColumnDef::new(CaseStudy::CoverImageUrl).string_len(512))
            .col(ColumnDef::new(CaseStudy::AttachmentUrl).string_len(512));

        manager.create_table(table).await?;

        content_indexes(manager, "case_study").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CaseStudy::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CaseStudy {
    Table,
    ClientName,
    Industry,
    Summary,
    Body,
    CoverImageUrl,
    AttachmentUrl,
}
