//! Comment entity, flag records, and moderation validation.
//!
//! A comment's moderation status and its flag accumulator are
//! orthogonal: flags accumulate regardless of status until a moderator
//! clears them or deletes the comment. Invariant:
//! `is_flagged == (flag_count > 0)`, exactly one flag per
//! (comment, user) pair.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{ArticleId, CommentId, FlagId, Timestamp, UserId};

/// Moderation status of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
    Spam,
}

/// Action a moderator can take on a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approve,
    Reject,
    Spam,
}

impl ModerationAction {
    /// The status a comment ends up in after this action.
    pub fn target_status(self) -> CommentStatus {
        match self {
            ModerationAction::Approve => CommentStatus::Approved,
            ModerationAction::Reject => CommentStatus::Rejected,
            ModerationAction::Spam => CommentStatus::Spam,
        }
    }
}

/// Why a user flagged a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagReason {
    Spam,
    Harassment,
    HateSpeech,
    Misinformation,
    Inappropriate,
    Other,
}

/// A single user's report against a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub id: FlagId,
    pub comment_id: CommentId,
    pub reason: FlagReason,
    pub details: Option<String>,
    pub raised_by: UserId,
    pub created_at: Timestamp,
}

impl Flag {
    pub fn new(
        comment_id: CommentId,
        raised_by: UserId,
        reason: FlagReason,
        details: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            comment_id,
            reason,
            details,
            raised_by,
            created_at: chrono::Utc::now(),
        }
    }
}

/// A persisted reader comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub article_id: ArticleId,
    pub author_id: UserId,
    pub body: String,
    pub status: CommentStatus,
    pub is_flagged: bool,
    pub flag_count: u32,
    pub moderated_by: Option<UserId>,
    pub moderated_at: Option<Timestamp>,
    /// Reason recorded with the moderation decision (mandatory for
    /// rejections).
    pub moderation_reason: Option<String>,
    /// Soft-delete marker. Flags against a deleted comment are rejected.
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Comment {
    /// Create a comment in `Pending`, as every submission starts.
    pub fn new(article_id: ArticleId, author_id: UserId, body: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            article_id,
            author_id,
            body: body.into(),
            status: CommentStatus::Pending,
            is_flagged: false,
            flag_count: 0,
            moderated_by: None,
            moderated_at: None,
            moderation_reason: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the flag accumulator invariant holds.
    pub fn flag_invariant_holds(&self) -> bool {
        self.is_flagged == (self.flag_count > 0)
    }
}

/// Maximum length for free-form flag details.
pub const MAX_FLAG_DETAILS_LEN: usize = 500;

/// Validate a flag submission against the target comment. Does not
/// check for duplicate flags; that needs the store and is the
/// workflow's job.
pub fn validate_flag_request(
    comment: &Comment,
    raised_by: UserId,
    details: Option<&str>,
) -> CoreResult<()> {
    if comment.is_deleted() {
        return Err(CoreError::Validation(
            "Cannot flag a deleted comment".to_string(),
        ));
    }
    if comment.author_id == raised_by {
        return Err(CoreError::Validation(
            "Cannot flag your own comment".to_string(),
        ));
    }
    if let Some(d) = details {
        if d.len() > MAX_FLAG_DETAILS_LEN {
            return Err(CoreError::Validation(format!(
                "Flag details must be at most {MAX_FLAG_DETAILS_LEN} characters"
            )));
        }
    }
    Ok(())
}

/// Validate the reason attached to a moderation action. Rejections
/// require a non-blank reason.
pub fn validate_moderation_reason(
    action: ModerationAction,
    reason: Option<&str>,
) -> CoreResult<()> {
    if action == ModerationAction::Reject
        && !reason.map(|r| !r.trim().is_empty()).unwrap_or(false)
    {
        return Err(CoreError::Validation(
            "A reason is required when rejecting a comment".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn comment() -> Comment {
        Comment::new(uuid::Uuid::new_v4(), uuid::Uuid::new_v4(), "Nice issue")
    }

    #[test]
    fn new_comment_is_pending_and_unflagged() {
        let c = comment();
        assert_eq!(c.status, CommentStatus::Pending);
        assert!(!c.is_flagged);
        assert_eq!(c.flag_count, 0);
        assert!(c.flag_invariant_holds());
    }

    #[test]
    fn action_target_statuses() {
        assert_eq!(
            ModerationAction::Approve.target_status(),
            CommentStatus::Approved
        );
        assert_eq!(
            ModerationAction::Reject.target_status(),
            CommentStatus::Rejected
        );
        assert_eq!(ModerationAction::Spam.target_status(), CommentStatus::Spam);
    }

    #[test]
    fn cannot_flag_own_comment() {
        let c = comment();
        let err = validate_flag_request(&c, c.author_id, None).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn cannot_flag_deleted_comment() {
        let mut c = comment();
        c.deleted_at = Some(chrono::Utc::now());
        let err = validate_flag_request(&c, uuid::Uuid::new_v4(), None).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn oversized_details_are_rejected() {
        let c = comment();
        let long = "x".repeat(MAX_FLAG_DETAILS_LEN + 1);
        let err = validate_flag_request(&c, uuid::Uuid::new_v4(), Some(&long)).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn flag_from_another_user_passes_validation() {
        let c = comment();
        assert!(validate_flag_request(&c, uuid::Uuid::new_v4(), Some("rude")).is_ok());
    }

    #[test]
    fn reject_requires_a_reason() {
        assert_matches!(
            validate_moderation_reason(ModerationAction::Reject, None),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_moderation_reason(ModerationAction::Reject, Some("  ")),
            Err(CoreError::Validation(_))
        );
        assert!(validate_moderation_reason(ModerationAction::Reject, Some("abuse")).is_ok());
    }

    #[test]
    fn approve_and_spam_need_no_reason() {
        assert!(validate_moderation_reason(ModerationAction::Approve, None).is_ok());
        assert!(validate_moderation_reason(ModerationAction::Spam, None).is_ok());
    }
}
