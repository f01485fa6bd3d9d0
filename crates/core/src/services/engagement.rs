//! Engagement service: likes, dislikes and saved items.
//!
//! Reactions work the same for every content type and for comments: pressing
//! the reaction the user already holds clears it, pressing the other one
//! switches it. Drafts can only be engaged with by their channel's managers.

use std::collections::HashMap;

use biznetworq_common::{AppError, AppResult, IdGenerator};
use biznetworq_db::{
    entities::{ReactionKind, TargetKind, user},
    repositories::{EngagementRepository, ReactionState},
};
use serde::Serialize;

use super::{
    catalog::ContentCatalog,
    content::{ContentContext, ContentSummary, Page, ViewerState},
};

/// Reaction state returned after a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionResponse {
    pub reaction: Option<ReactionKind>,
    pub likes_count: i64,
    pub dislikes_count: i64,
}

impl From<ReactionState> for ReactionResponse {
    fn from(state: ReactionState) -> Self {
        Self {
            reaction: state.reaction,
            likes_count: state.likes,
            dislikes_count: state.dislikes,
        }
    }
}

/// Saved flag after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub saved: bool,
}

/// One entry of a user's saved list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItemResponse {
    pub saved_at: String,
    pub item: ContentSummary,
}

/// Service for reactions and saves.
#[derive(Clone)]
pub struct EngagementService {
    engagement_repo: EngagementRepository,
    catalog: ContentCatalog,
    ctx: ContentContext,
    id_gen: IdGenerator,
}

impl EngagementService {
    /// Create a new engagement service.
    #[must_use]
    pub const fn new(
        engagement_repo: EngagementRepository,
        catalog: ContentCatalog,
        ctx: ContentContext,
    ) -> Self {
        Self {
            engagement_repo,
            catalog,
            ctx,
            id_gen: IdGenerator::new(),
        }
    }

    /// Press the like or dislike button.
    pub async fn react(
        &self,
        user: &user::Model,
        kind: TargetKind,
        target_id: &str,
        pressed: ReactionKind,
    ) -> AppResult<ReactionResponse> {
        self.ctx.ensure_visible(Some(user), kind, target_id).await?;
        let state = self
            .engagement_repo
            .set_reaction(self.id_gen.generate(), &user.id, kind, target_id, Some(pressed))
            .await?;
        Ok(state.into())
    }

    /// Drop whatever reaction the user holds.
    pub async fn clear_reaction(
        &self,
        user: &user::Model,
        kind: TargetKind,
        target_id: &str,
    ) -> AppResult<ReactionResponse> {
        self.ctx.ensure_visible(Some(user), kind, target_id).await?;
        let state = self
            .engagement_repo
            .set_reaction(self.id_gen.generate(), &user.id, kind, target_id, None)
            .await?;
        Ok(state.into())
    }

    /// Save an item, or unsave it when already saved.
    pub async fn toggle_save(
        &self,
        user: &user::Model,
        kind: TargetKind,
        target_id: &str,
    ) -> AppResult<SaveResponse> {
        if !kind.is_content() {
            return Err(AppError::BadRequest("Comments cannot be saved".to_string()));
        }
        self.ctx.ensure_visible(Some(user), kind, target_id).await?;

        let saved = self
            .engagement_repo
            .toggle_save(self.id_gen.generate(), &user.id, kind, target_id)
            .await?;

        tracing::debug!(user_id = %user.id, target_kind = %kind, target_id = %target_id, saved, "Save toggled");
        Ok(SaveResponse { saved })
    }

    /// The user's reaction and saved flag for one target.
    pub async fn viewer_state(
        &self,
        user: &user::Model,
        kind: TargetKind,
        target_id: &str,
    ) -> AppResult<ViewerState> {
        self.ctx.ensure_visible(Some(user), kind, target_id).await?;

        let reaction = self
            .engagement_repo
            .find_reaction(&user.id, kind, target_id)
            .await?
            .map(|r| r.kind);
        let saved = kind.is_content()
            && self
                .engagement_repo
                .is_saved(&user.id, kind, target_id)
                .await?;

        Ok(ViewerState { reaction, saved })
    }

    /// The user's saved items, most recently saved first.
    ///
    /// Items deleted since they were saved are left out, as are items moved
    /// back to draft unless the user manages their channel.
    pub async fn saved_items(
        &self,
        user: &user::Model,
        kind: Option<TargetKind>,
        page: Page,
    ) -> AppResult<Vec<SavedItemResponse>> {
        if kind.is_some_and(|k| !k.is_content()) {
            return Err(AppError::BadRequest("Comments cannot be saved".to_string()));
        }

        let saved = self
            .engagement_repo
            .find_saved(&user.id, kind, page.limit(), page.offset())
            .await?;

        let mut summaries: HashMap<(TargetKind, String), ContentSummary> = HashMap::new();
        for kind in TargetKind::CONTENT {
            let ids: Vec<String> = saved
                .iter()
                .filter(|row| row.target_kind == kind)
                .map(|row| row.target_id.clone())
                .collect();
            if ids.is_empty() {
                continue;
            }
            for summary in self.catalog.summaries_by_ids(kind, &ids).await? {
                summaries.insert((kind, summary.id.clone()), summary);
            }
        }

        let mut managed: HashMap<String, bool> = HashMap::new();
        let mut items = Vec::with_capacity(saved.len());
        for row in saved {
            let Some(item) = summaries.remove(&(row.target_kind, row.target_id)) else {
                continue;
            };
            if !item.is_published {
                let can_see = match managed.get(&item.channel_id) {
                    Some(&known) => known,
                    None => {
                        let known = self.ctx.is_manager(Some(user), &item.channel_id).await?;
                        managed.insert(item.channel_id.clone(), known);
                        known
                    }
                };
                if !can_see {
                    continue;
                }
            }
            items.push(SavedItemResponse {
                saved_at: row.created_at.to_rfc3339(),
                item,
            });
        }

        Ok(items)
    }
}
