//! Column sets shared by every engageable table.
//!
//! Reactions, comment counters and view counters are maintained the same
//! way for every content table, so repositories work against these traits
//! instead of one copy of the logic per entity.

use sea_orm::EntityTrait;

use super::target_kind::TargetKind;

/// Tables carrying like/dislike counters.
pub trait ReactionCounters: EntityTrait {
    /// Primary key column.
    const ID: <Self as EntityTrait>::Column;
    /// Like counter.
    const LIKES: <Self as EntityTrait>::Column;
    /// Dislike counter.
    const DISLIKES: <Self as EntityTrait>::Column;
}

/// Content tables: reactable, commentable, viewable and owned by a channel.
pub trait ContentColumns: ReactionCounters {
    /// Kind recorded on reactions, comments and saves pointing here.
    const KIND: TargetKind;
    /// Owning channel.
    const CHANNEL_ID: <Self as EntityTrait>::Column;
    /// Title, used for search.
    const TITLE: <Self as EntityTrait>::Column;
    /// Unique slug.
    const SLUG: <Self as EntityTrait>::Column;
    /// Visibility flag.
    const IS_PUBLISHED: <Self as EntityTrait>::Column;
    /// Creation time, used for ordering.
    const CREATED_AT: <Self as EntityTrait>::Column;
    /// View counter.
    const VIEWS: <Self as EntityTrait>::Column;
    /// Comment counter.
    const COMMENTS: <Self as EntityTrait>::Column;
}

macro_rules! content_columns {
    ($($module:ident => $kind:ident),+ $(,)?) => {
        $(
            impl ReactionCounters for super::$module::Entity {
                const ID: super::$module::Column = super::$module::Column::Id;
                const LIKES: super::$module::Column = super::$module::Column::LikesCount;
                const DISLIKES: super::$module::Column = super::$module::Column::DislikesCount;
            }

            impl ContentColumns for super::$module::Entity {
                const KIND: TargetKind = TargetKind::$kind;
                const CHANNEL_ID: super::$module::Column = super::$module::Column::ChannelId;
                const TITLE: super::$module::Column = super::$module::Column::Title;
                const SLUG: super::$module::Column = super::$module::Column::Slug;
                const IS_PUBLISHED: super::$module::Column = super::$module::Column::IsPublished;
                const CREATED_AT: super::$module::Column = super::$module::Column::CreatedAt;
                const VIEWS: super::$module::Column = super::$module::Column::ViewsCount;
                const COMMENTS: super::$module::Column = super::$module::Column::CommentsCount;
            }
        )+
    };
}

content_columns!(
    video => Video,
    blog_post => BlogPost,
    case_study => CaseStudy,
    tech_news => TechNews,
    pdf_document => PdfDocument,
    short => Short,
);

impl ReactionCounters for super::comment::Entity {
    const ID: super::comment::Column = super::comment::Column::Id;
    const LIKES: super::comment::Column = super::comment::Column::LikesCount;
    const DISLIKES: super::comment::Column = super::comment::Column::DislikesCount;
}
