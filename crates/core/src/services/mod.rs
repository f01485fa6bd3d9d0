//! Business logic services.

#![allow(missing_docs)]

pub mod blog;
pub mod case_study;
pub mod catalog;
pub mod channel;
pub mod comment;
pub mod content;
pub mod engagement;
pub mod feed;
pub mod pdf;
pub mod short;
pub mod slug;
pub mod tech_news;
pub mod upload;
pub mod user;
pub mod video;

#[cfg(test)]
mod test_support;

pub use blog::{
    BlogPostResponse, BlogService, CreateBlogPostInput, ListBlogPostsQuery, UpdateBlogPostInput,
};
pub use case_study::{
    CaseStudyResponse, CaseStudyService, CreateCaseStudyInput, ListCaseStudiesQuery,
    UpdateCaseStudyInput,
};
pub use catalog::{ContentCatalog, ContentCounts};
pub use channel::{
    ChannelDetail, ChannelResponse, ChannelService, ChannelStats, CreateChannelInput,
    SubscriptionState, UpdateChannelInput,
};
pub use comment::{CommentAuthor, CommentResponse, CommentService, CreateCommentInput};
pub use content::{ContentContext, ContentDetail, ContentSummary, Page, ViewerState};
pub use engagement::{EngagementService, ReactionResponse, SaveResponse, SavedItemResponse};
pub use feed::{FeedService, parse_kinds};
pub use pdf::{CreatePdfInput, DownloadResponse, ListPdfsQuery, PdfResponse, PdfService, UpdatePdfInput};
pub use short::{CreateShortInput, ListShortsQuery, ShortResponse, ShortService, UpdateShortInput};
pub use slug::{SlugStore, slugify};
pub use tech_news::{
    CreateTechNewsInput, ListTechNewsQuery, TechNewsResponse, TechNewsService, UpdateTechNewsInput,
};
pub use upload::{UploadKind, UploadRequest, UploadResponse, UploadService};
pub use user::{
    AuthSession, SigninInput, SignupInput, UpdateProfileInput, UserResponse, UserService,
};
pub use video::{
    CreateVideoInput, ListVideosQuery, UpdateVideoInput, VideoResponse, VideoService,
};
