//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_channel_table;
mod m20250101_000003_create_video_table;
mod m20250101_000004_create_blog_post_table;
mod m20250101_000005_create_case_study_table;
mod m20250101_000006_create_tech_news_table;
mod m20250101_000007_create_pdf_document_table;
mod m20250101_000008_create_short_table;
mod m20250101_000009_create_comment_table;
mod m20250101_000010_create_engagement_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_channel_table::Migration),
            Box::new(m20250101_000003_create_video_table::Migration),
            Box::new(m20250101_000004_create_blog_post_table::Migration),
            Box::new(m20250101_000005_create_case_study_table::Migration),
            Box::new(m20250101_000006_create_tech_news_table::Migration),
            Box::new(m20250101_000007_create_pdf_document_table::Migration),
            Box::new(m20250101_000008_create_short_table::Migration),
            Box::new(m20250101_000009_create_comment_table::Migration),
            Box::new(m20250101_000010_create_engagement_tables::Migration),
        ]
    }
}

/// Columns every content table carries after its own fields: owner
/// references, slug, tags, publication flag, engagement counters and
/// timestamps.
fn content_columns(table: &mut TableCreateStatement, name: &'static str) {
    let counter = |column: &'static str| {
        ColumnDef::new(Alias::new(column))
            .big_integer()
            .not_null()
            .default(0)
            .to_owned()
    };

    table
        .col(
            ColumnDef::new(Alias::new("id"))
                .string_len(32)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Alias::new("channel_id")).string_len(32).not_null())
        .col(ColumnDef::new(Alias::new("author_id")).string_len(32).not_null())
        .col(ColumnDef::new(Alias::new("title")).string_len(256).not_null())
        .col(
            ColumnDef::new(Alias::new("slug"))
                .string_len(300)
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(Alias::new("tags"))
                .json_binary()
                .not_null()
                .default(Expr::cust("'[]'::jsonb")),
        )
        .col(
            ColumnDef::new(Alias::new("is_published"))
                .boolean()
                .not_null()
                .default(true),
        )
        .col(&mut counter("views_count"))
        .col(&mut counter("likes_count"))
        .col(&mut counter("dislikes_count"))
        .col(&mut counter("comments_count"))
        .col(
            ColumnDef::new(Alias::new("created_at"))
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(ColumnDef::new(Alias::new("updated_at")).timestamp_with_time_zone())
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{name}_channel"))
                .from(Alias::new(name), Alias::new("channel_id"))
                .to(Alias::new("channel"), Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{name}_author"))
                .from(Alias::new(name), Alias::new("author_id"))
                .to(Alias::new("user"), Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade),
        );
}

/// Indexes used by channel listings and the cross-type feed.
async fn content_indexes(manager: &SchemaManager<'_>, name: &'static str) -> Result<(), DbErr> {
    manager
        .create_index(
            Index::create()
                .name(format!("idx_{name}_channel_id"))
                .table(Alias::new(name))
                .col(Alias::new("channel_id"))
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name(format!("idx_{name}_published_created_at"))
                .table(Alias::new(name))
                .col(Alias::new("is_published"))
                .col(Alias::new("created_at"))
                .to_owned(),
        )
        .await
}
