//! Comment entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::target_kind::TargetKind;

/// A comment on a piece of content, or a reply to another comment.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Kind of the commented content. Never `comment`.
    pub target_kind: TargetKind,

    #[sea_orm(indexed)]
    pub target_id: String,

    /// Top-level comment this one replies to.
    #[sea_orm(nullable, indexed)]
    pub parent_id: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    #[sea_orm(default_value = 0)]
    pub likes_count: i64,

    #[sea_orm(default_value = 0)]
    pub dislikes_count: i64,

    /// Number of direct replies (denormalized).
    #[sea_orm(default_value = 0)]
    pub replies_count: i64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "Cascade"
    )]
    Parent,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
