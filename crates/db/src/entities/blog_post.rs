//! Blog post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub channel_id: String,

    pub author_id: String,

    pub title: String,

    #[sea_orm(unique)]
    pub slug: String,

    /// Short teaser shown in listings.
    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    #[sea_orm(nullable)]
    pub cover_image_url: Option<String>,

    /// Estimated reading time, derived from the body.
    #[sea_orm(default_value = 1)]
    pub read_minutes: i32,

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
