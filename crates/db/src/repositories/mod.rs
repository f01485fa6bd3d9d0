//! Repositories for database access.

mod targets;

pub mod channel;
pub mod comment;
pub mod content;
pub mod engagement;
pub mod user;

pub use channel::ChannelRepository;
pub use comment::{CommentRepository, NewComment};
pub use content::{
    BlogPostRepository, CaseStudyRepository, ContentQuery, ContentRepository,
    PdfDocumentRepository, ShortRepository, TechNewsRepository, VideoRepository,
};
pub use engagement::{
    EngagementRepository, ReactionChange, ReactionState, TargetVisibility, resolve_reaction,
};
pub use user::UserRepository;

use biznetworq_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Map an insert failure, reporting unique-key violations as `Conflict`.
pub(crate) fn insert_error(err: DbErr, what: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(format!("{what} already exists"))
        }
        _ => AppError::Database(err.to_string()),
    }
}
