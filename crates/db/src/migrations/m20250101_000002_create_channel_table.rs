//! Create channel and subscription tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Channel::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Channel::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Channel::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(Channel::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Channel::Slug)
                            .string_len(160)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Channel::Description).text())
                    .col(ColumnDef::new(Channel::LogoUrl).string_len(512))
                    .col(ColumnDef::new(Channel::BannerUrl).string_len(512))
                    .col(ColumnDef::new(Channel::WebsiteUrl).string_len(512))
                    .col(
                        ColumnDef::new(Channel::SubscribersCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Channel::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Channel::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_channel_owner")
                            .from(Channel::Table, Channel::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_channel_owner_id")
                    .table(Channel::Table)
                    .col(Channel::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Sorting by popularity
        manager
            .create_index(
                Index::create()
                    .name("idx_channel_subscribers_count")
                    .table(Channel::Table)
                    .col(Channel::SubscribersCount)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subscription::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscription::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscription::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Subscription::ChannelId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscription::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_user")
                            .from(Subscription::Table, Subscription::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_channel")
                            .from(Subscription::Table, Subscription::ChannelId)
                            .to(Channel::Table, Channel::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_channel_id")
                    .table(Subscription::Table)
                    .col(Subscription::ChannelId)
                    .to_owned(),
            )
            .await?;

        // One subscription per (user, channel)
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_unique")
                    .table(Subscription::Table)
                    .col(Subscription::UserId)
                    .col(Subscription::ChannelId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscription::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Channel::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Channel {
    Table,
    Id,
    OwnerId,
    Name,
    Slug,
    Description,
    LogoUrl,
    BannerUrl,
    WebsiteUrl,
    SubscribersCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Subscription {
    Table,
    Id,
    UserId,
    ChannelId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
