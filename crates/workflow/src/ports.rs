//! External interfaces consumed by the workflow services.
//!
//! The multi-field transitions (flag creation + counter increment,
//! unflag's flag deletion + counter reset) are single trait methods on
//! purpose: the implementation must apply them as one atomic unit
//! (one lock guard in memory, one transaction in a database). Partial
//! application is a correctness violation, not a degraded state.

use async_trait::async_trait;

use masthead_core::error::CoreResult;
use masthead_core::moderation::{Comment, Flag};
use masthead_core::publishing::Article;
use masthead_core::roles::Role;
use masthead_core::types::{ArticleId, CommentId, UserId};

/// Persistence seam for articles. Whole-record updates; last write wins
/// between concurrent moderators.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn find(&self, id: ArticleId) -> CoreResult<Option<Article>>;

    /// Persist all fields of an existing article as one unit.
    async fn update(&self, article: &Article) -> CoreResult<()>;

    async fn insert(&self, article: &Article) -> CoreResult<()>;
}

/// Persistence seam for comments and their flag records.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn find(&self, id: CommentId) -> CoreResult<Option<Comment>>;

    /// Fetch many comments; ids with no record are silently absent from
    /// the result.
    async fn find_many(&self, ids: &[CommentId]) -> CoreResult<Vec<Comment>>;

    /// Persist all fields of an existing comment as one unit.
    async fn update(&self, comment: &Comment) -> CoreResult<()>;

    async fn flags_for(&self, comment_id: CommentId) -> CoreResult<Vec<Flag>>;

    async fn has_flag_from(&self, comment_id: CommentId, user_id: UserId) -> CoreResult<bool>;

    /// Atomically create the flag record, increment the comment's
    /// `flag_count`, and set `is_flagged`. Returns the updated comment.
    ///
    /// Implementations must enforce the one-flag-per-(comment, user)
    /// invariant inside the same atomic unit and reject a duplicate
    /// with `CoreError::Conflict`; the service's pre-check cannot see
    /// a concurrent racer.
    async fn create_flag_and_increment(&self, flag: Flag) -> CoreResult<Comment>;

    /// Atomically delete every flag record for the comment and reset
    /// `flag_count`/`is_flagged`. Returns the updated comment.
    async fn clear_flags(&self, comment_id: CommentId) -> CoreResult<Comment>;

    /// Atomically soft-delete the comment and drop its flag records.
    /// Returns the updated comment.
    async fn soft_delete_and_clear_flags(&self, comment_id: CommentId) -> CoreResult<Comment>;
}

/// Authorization seam. Role and ownership predicates are composed into
/// the concrete gates by the services.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// The actor's role, or `None` for an unknown user.
    async fn role_of(&self, user_id: UserId) -> CoreResult<Option<Role>>;
}

/// Slug uniqueness seam. The returned slug is collision-free against
/// existing records at call time.
#[async_trait]
pub trait SlugGenerator: Send + Sync {
    async fn unique_slug(&self, base: &str) -> CoreResult<String>;
}
