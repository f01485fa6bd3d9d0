//! PDF document entity (ebooks, infographics and white papers).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category of a PDF document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PdfCategory {
    #[sea_orm(string_value = "ebook")]
    Ebook,
    #[sea_orm(string_value = "infographic")]
    Infographic,
    #[sea_orm(string_value = "white_paper")]
    WhitePaper,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pdf_document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub channel_id: String,

    pub author_id: String,

    #[sea_orm(indexed)]
    pub category: PdfCategory,

    pub title: String,

    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub file_url: String,

    #[sea_orm(nullable)]
    pub thumbnail_url: Option<String>,

    #[sea_orm(nullable)]
    pub page_count: Option<i32>,

    #[sea_orm(default_value = 0)]
    pub downloads_count: i64,

    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    #[sea_orm(default_value = true)]
    pub is_published: bool,

    #[sea_orm(default_value = 0)]
    pub views_count: i64,

    #[sea_orm(default_value = 0)]
    pub likes_count: i64,

    #[sea_orm(default_value = 0)]
    pub dislikes_count: i64,

    #[sea_orm(default_value = 0)]
    pub comments_count: i64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::channel::Entity",
        from = "Column::ChannelId",
        to = "super::channel::Column::Id",
        on_delete = "Cascade"
    )]
    Channel,
}

impl Related<super::channel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Channel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
