//! Comment moderation workflow.
//!
//! Flags accumulate independently of the moderation status; the two
//! only meet when a moderator clears the accumulator or deletes the
//! comment. The multi-field flag transitions go through the single
//! atomic store calls defined in [`crate::ports`].

use std::sync::Arc;

use masthead_core::error::{CoreError, CoreResult};
use masthead_core::moderation::{
    validate_flag_request, validate_moderation_reason, Comment, CommentStatus, Flag, FlagReason,
    ModerationAction,
};
use masthead_core::types::{CommentId, UserId};

use crate::ports::{Authorizer, CommentStore};

/// Result of a bulk moderation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkModerationOutcome {
    /// Comments that were `Pending` and got the action applied.
    pub moderated: usize,
    /// Comments skipped because they were not `Pending` (or missing).
    pub skipped: usize,
}

/// Flagging and moderation over persisted comments.
pub struct ModerationService {
    store: Arc<dyn CommentStore>,
    auth: Arc<dyn Authorizer>,
}

impl ModerationService {
    pub fn new(store: Arc<dyn CommentStore>, auth: Arc<dyn Authorizer>) -> Self {
        Self { store, auth }
    }

    /// Report a comment. Rejected for soft-deleted comments, self-flags,
    /// and duplicate flags from the same user (idempotent-reject: the
    /// second attempt is a `Conflict`, not a silent success).
    pub async fn flag(
        &self,
        comment_id: CommentId,
        raised_by: UserId,
        reason: FlagReason,
        details: Option<String>,
    ) -> CoreResult<Comment> {
        let comment = self.load(comment_id).await?;
        validate_flag_request(&comment, raised_by, details.as_deref())?;
        if self.store.has_flag_from(comment_id, raised_by).await? {
            return Err(CoreError::Conflict(
                "You have already flagged this comment".to_string(),
            ));
        }

        let flag = Flag::new(comment_id, raised_by, reason, details);
        let updated = self.store.create_flag_and_increment(flag).await?;

        tracing::info!(
            comment_id = %comment_id,
            raised_by = %raised_by,
            reason = ?reason,
            flag_count = updated.flag_count,
            "Comment flagged"
        );
        Ok(updated)
    }

    /// Apply a moderation decision. Role-gated; rejections require a
    /// reason.
    pub async fn moderate(
        &self,
        comment_id: CommentId,
        actor: UserId,
        action: ModerationAction,
        reason: Option<String>,
    ) -> CoreResult<Comment> {
        self.require_moderator(actor).await?;
        validate_moderation_reason(action, reason.as_deref())?;
        let mut comment = self.load(comment_id).await?;

        apply_decision(&mut comment, actor, action, reason);
        self.store.update(&comment).await?;

        tracing::info!(
            comment_id = %comment_id,
            actor = %actor,
            action = ?action,
            "Comment moderated"
        );
        Ok(comment)
    }

    /// Clear every flag on a comment and reset the accumulator. Does not
    /// change the moderation status.
    pub async fn unflag(&self, comment_id: CommentId, actor: UserId) -> CoreResult<Comment> {
        self.require_moderator(actor).await?;
        // Surface NotFound before touching the flag records.
        self.load(comment_id).await?;
        let updated = self.store.clear_flags(comment_id).await?;

        tracing::info!(comment_id = %comment_id, actor = %actor, "Comment flags cleared");
        Ok(updated)
    }

    /// Soft-delete a comment and drop its flag records. Allowed for the
    /// comment author and for moderators.
    pub async fn delete(&self, comment_id: CommentId, actor: UserId) -> CoreResult<Comment> {
        let comment = self.load(comment_id).await?;
        if comment.is_deleted() {
            return Err(CoreError::Conflict(
                "Comment is already deleted".to_string(),
            ));
        }
        if comment.author_id != actor {
            self.require_moderator(actor).await?;
        }
        let updated = self.store.soft_delete_and_clear_flags(comment_id).await?;

        tracing::info!(comment_id = %comment_id, actor = %actor, "Comment deleted");
        Ok(updated)
    }

    /// Apply a decision to every `Pending` comment in the set.
    /// Non-`Pending` (and missing) comments are skipped, not errors.
    pub async fn bulk_moderate(
        &self,
        comment_ids: &[CommentId],
        actor: UserId,
        action: ModerationAction,
        reason: Option<String>,
    ) -> CoreResult<BulkModerationOutcome> {
        self.require_moderator(actor).await?;
        validate_moderation_reason(action, reason.as_deref())?;

        let comments = self.store.find_many(comment_ids).await?;
        let mut outcome = BulkModerationOutcome {
            moderated: 0,
            skipped: comment_ids.len() - comments.len(),
        };

        for mut comment in comments {
            if comment.status != CommentStatus::Pending {
                tracing::debug!(
                    comment_id = %comment.id,
                    status = ?comment.status,
                    "Bulk moderation skipped non-pending comment"
                );
                outcome.skipped += 1;
                continue;
            }
            apply_decision(&mut comment, actor, action, reason.clone());
            self.store.update(&comment).await?;
            outcome.moderated += 1;
        }

        tracing::info!(
            actor = %actor,
            action = ?action,
            moderated = outcome.moderated,
            skipped = outcome.skipped,
            "Bulk moderation finished"
        );
        Ok(outcome)
    }

    async fn load(&self, comment_id: CommentId) -> CoreResult<Comment> {
        self.store
            .find(comment_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Comment", comment_id))
    }

    async fn require_moderator(&self, actor: UserId) -> CoreResult<()> {
        match self.auth.role_of(actor).await? {
            Some(role) if role.can_moderate() => Ok(()),
            _ => Err(CoreError::Forbidden(
                "Editor or admin role required".to_string(),
            )),
        }
    }
}

fn apply_decision(
    comment: &mut Comment,
    actor: UserId,
    action: ModerationAction,
    reason: Option<String>,
) {
    let now = chrono::Utc::now();
    comment.status = action.target_status();
    comment.moderated_by = Some(actor);
    comment.moderated_at = Some(now);
    comment.moderation_reason = reason;
    comment.updated_at = now;
}
