//! Kinds of rows that can be reacted to, commented on or saved.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Target of a reaction, comment or saved item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "blog_post")]
    BlogPost,
    #[sea_orm(string_value = "case_study")]
    CaseStudy,
    #[sea_orm(string_value = "tech_news")]
    TechNews,
    #[sea_orm(string_value = "pdf_document")]
    PdfDocument,
    #[sea_orm(string_value = "short")]
    Short,
    #[sea_orm(string_value = "comment")]
    Comment,
}

impl TargetKind {
    /// Every kind of publishable content (everything except comments).
    pub const CONTENT: [Self; 6] = [
        Self::Video,
        Self::BlogPost,
        Self::CaseStudy,
        Self::TechNews,
        Self::PdfDocument,
        Self::Short,
    ];

    /// Whether this is publishable content rather than a comment.
    #[must_use]
    pub const fn is_content(self) -> bool {
        !matches!(self, Self::Comment)
    }

    /// Stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::BlogPost => "blog_post",
            Self::CaseStudy => "case_study",
            Self::TechNews => "tech_news",
            Self::PdfDocument => "pdf_document",
            Self::Short => "short",
            Self::Comment => "comment",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
