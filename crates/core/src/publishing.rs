//! Article entity and the publishing state machine.
//!
//! The transition table lives here in `core` (zero internal deps) so it
//! can be shared by the workflow service, any API layer, and tooling.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{ArticleId, Timestamp, UserId};

/// Lifecycle status of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    Submitted,
    Approved,
    Published,
    Rejected,
    Archived,
}

impl ArticleStatus {
    /// Whether the article has not yet been published in this cycle.
    /// Review decisions (approve/reject) only apply to these states.
    pub fn is_pre_publish(self) -> bool {
        matches!(
            self,
            ArticleStatus::Draft
                | ArticleStatus::Submitted
                | ArticleStatus::Approved
                | ArticleStatus::Rejected
        )
    }
}

/// A persisted article record.
///
/// Status transitions are driven exclusively through the publishing
/// workflow; `published_at` is set on first entry to `Published` and
/// survives unpublish (the first publication date is an editorial fact).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub author_id: UserId,
    pub title: String,
    pub slug: String,
    pub status: ArticleStatus,
    pub published_at: Option<Timestamp>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<Timestamp>,
    pub review_notes: Option<String>,
    pub view_count: u64,
    pub like_count: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Article {
    /// Create a fresh draft.
    pub fn new_draft(author_id: UserId, title: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            author_id,
            title: title.into(),
            slug: slug.into(),
            status: ArticleStatus::Draft,
            published_at: None,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            view_count: 0,
            like_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Clear the review decision fields (on duplication or resubmission).
    pub fn clear_review_fields(&mut self) {
        self.reviewed_by = None;
        self.reviewed_at = None;
        self.review_notes = None;
    }
}

/// Title given to a duplicated article.
pub fn duplicate_title(original: &str) -> String {
    format!("{original} (Copy)")
}

/// Validate the feedback attached to a rejection. Mandatory and
/// non-blank; its absence is a validation error, never silently ignored.
pub fn validate_reject_feedback(feedback: Option<&str>) -> CoreResult<()> {
    match feedback {
        Some(f) if !f.trim().is_empty() => Ok(()),
        _ => Err(CoreError::Validation(
            "Rejection feedback is required".to_string(),
        )),
    }
}

/// The publishing transition table.
pub mod state_machine {
    use super::ArticleStatus;

    /// Returns the set of valid target statuses reachable from `from`.
    ///
    /// `Archived` is terminal: no further transitions are allowed.
    pub fn valid_transitions(from: ArticleStatus) -> &'static [ArticleStatus] {
        use ArticleStatus::*;
        match from {
            Draft => &[Submitted, Approved, Rejected, Published, Archived],
            Submitted => &[Approved, Rejected, Published, Archived],
            Approved => &[Published, Rejected, Archived],
            // Unpublish returns the article to Draft.
            Published => &[Draft, Archived],
            Rejected => &[Submitted, Approved, Archived],
            Archived => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    /// Re-entering the same status (e.g. re-approve) is always allowed.
    pub fn can_transition(from: ArticleStatus, to: ArticleStatus) -> bool {
        from == to || valid_transitions(from).contains(&to)
    }

    /// Validate a transition, producing a descriptive error for invalid
    /// ones.
    pub fn validate_transition(
        from: ArticleStatus,
        to: ArticleStatus,
    ) -> Result<(), super::CoreError> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(super::CoreError::Validation(format!(
                "Invalid article transition: {from:?} -> {to:?}"
            )))
        }
    }
}
