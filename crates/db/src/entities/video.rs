//! Video entity.
//!
//! Videos, webinars, podcasts, testimonials, demos and events share one
//! table and are told apart by [`VideoKind`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of media stored in the video table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum VideoKind {
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "webinar")]
    Webinar,
    #[sea_orm(string_value = "podcast")]
    Podcast,
    #[sea_orm(string_value = "testimonial")]
    Testimonial,
    #[sea_orm(string_value = "demo")]
    Demo,
    #[sea_orm(string_value = "event")]
    Event,
}

impl VideoKind {
    /// Webinars and events are scheduled and may carry a registration link.
    #[must_use]
    pub const fn is_scheduled(self) -> bool {
        matches!(self, Self::Webinar | Self::Event)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub channel_id: String,

    /// User who published the item.
    pub author_id: String,

    #[sea_orm(indexed)]
    pub kind: VideoKind,

    pub title: String,

    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Video or audio file URL.
    pub media_url: String,

    #[sea_orm(nullable)]
    pub thumbnail_url: Option<String>,

    #[sea_orm(nullable)]
    pub duration_seconds: Option<i32>,

    /// Webinars and events only.
    #[sea_orm(nullable)]
    pub starts_at: Option<DateTimeWithTimeZone>,

    /// Webinars and events only.
    #[sea_orm(nullable)]
    pub registration_url: Option<String>,

    /// Tags for categorization (JSON array of strings).
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
