//! Create video table (videos, webinars, podcasts, testimonials, demos, events).

use sea_orm_migration::prelude::*;

use super::{content_columns, content_indexes};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table.table(Video::Table).if_not_exists();
        content_columns(&mut table, "video");
        table
            .col(ColumnDef::new(Video::Kind).string_len(16).not_null())
            .col(ColumnDef::new(Video::Description).text())
            .col(ColumnDef::new(Video::MediaUrl).string_len(512).not_null())
            .col(ColumnDef::new(Video::ThumbnailUrl).string_len(512))
            .col(ColumnDef::new(Video::DurationSeconds).integer())
            .col(ColumnDef::new(Video::StartsAt).timestamp_with_time_zone())
            .col(ColumnDef::new(Video::RegistrationUrl).string_len(512));

        manager.create_table(table).await?;

        content_indexes(manager, "video").await?;

        // Listing by kind (`/videos?kind=webinar`)
        manager
            .create_index(
                Index::create()
                    .name("idx_video_kind")
                    .table(Video::Table)
                    .col(Video::Kind)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Video::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Video {
    Table,
    Kind,
    Description,
    MediaUrl,
    ThumbnailUrl,
    DurationSeconds,
    StartsAt,
    RegistrationUrl,
}
