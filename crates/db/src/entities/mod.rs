//! Database entities.

pub mod blog_post;
pub mod case_study;
pub mod channel;
pub mod comment;
pub mod counters;
pub mod pdf_document;
pub mod reaction;
pub mod saved_item;
pub mod short;
pub mod subscription;
pub mod target_kind;
pub mod tech_news;
pub mod user;
pub mod video;

pub use blog_post::Entity as BlogPost;
pub use case_study::Entity as CaseStudy;
pub use channel::Entity as Channel;
pub use comment::Entity as Comment;
pub use counters::{ContentColumns, ReactionCounters};
pub use pdf_document::{Entity as PdfDocument, PdfCategory};
pub use reaction::{Entity as Reaction, ReactionKind};
pub use saved_item::Entity as SavedItem;
pub use short::Entity as Short;
pub use subscription::Entity as Subscription;
pub use target_kind::TargetKind;
pub use tech_news::Entity as TechNews;
pub use user::Entity as User;
pub use video::{Entity as Video, VideoKind};
