//! Shared type aliases used across the workspace.

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier for a platform user.
pub type UserId = uuid::Uuid;

/// Identifier for a persisted article.
pub type ArticleId = uuid::Uuid;

/// Identifier for a persisted comment.
pub type CommentId = uuid::Uuid;

/// Identifier for a single flag record on a comment.
pub type FlagId = uuid::Uuid;
