//! Mutex-guarded hash maps behind the workflow store traits.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use masthead_core::document::Document;
use masthead_core::error::{CoreError, CoreResult};
use masthead_core::moderation::{Comment, Flag};
use masthead_core::publishing::Article;
use masthead_core::roles::Role;
use masthead_core::types::{ArticleId, CommentId, UserId};
use masthead_workflow::ports::{ArticleStore, Authorizer, CommentStore, SlugGenerator};

#[derive(Default)]
struct Inner {
    articles: HashMap<ArticleId, Article>,
    comments: HashMap<CommentId, Comment>,
    flags: HashMap<CommentId, Vec<Flag>>,
    documents: HashMap<ArticleId, Document>,
    slugs: HashSet<String>,
}

/// In-memory article/comment/flag store.
///
/// One mutex over the whole state: every trait method is one atomic
/// unit, including the multi-field flag transitions.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an article in the store directly (test/bootstrap seeding).
    pub async fn seed_article(&self, article: Article) {
        let mut inner = self.inner.lock().await;
        inner.slugs.insert(article.slug.clone());
        inner.articles.insert(article.id, article);
    }

    /// Put a comment in the store directly (test/bootstrap seeding).
    pub async fn seed_comment(&self, comment: Comment) {
        self.inner.lock().await.comments.insert(comment.id, comment);
    }

    /// Persist an article's block document (the auto-save target).
    pub async fn save_document(&self, article_id: ArticleId, document: Document) {
        self.inner.lock().await.documents.insert(article_id, document);
    }

    /// The last persisted block document for an article.
    pub async fn document(&self, article_id: ArticleId) -> Option<Document> {
        self.inner.lock().await.documents.get(&article_id).cloned()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn find(&self, id: ArticleId) -> CoreResult<Option<Article>> {
        Ok(self.inner.lock().await.articles.get(&id).cloned())
    }

    async fn update(&self, article: &Article) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.articles.contains_key(&article.id) {
            return Err(CoreError::not_found("Article", article.id));
        }
        inner.articles.insert(article.id, article.clone());
        Ok(())
    }

    async fn insert(&self, article: &Article) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;
        if inner
            .articles
            .values()
            .any(|a| a.slug == article.slug && a.id != article.id)
        {
            return Err(CoreError::Conflict(format!(
                "Slug '{}' is already taken",
                article.slug
            )));
        }
        inner.slugs.insert(article.slug.clone());
        inner.articles.insert(article.id, article.clone());
        Ok(())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn find(&self, id: CommentId) -> CoreResult<Option<Comment>> {
        Ok(self.inner.lock().await.comments.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[CommentId]) -> CoreResult<Vec<Comment>> {
        let inner = self.inner.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.comments.get(id).cloned())
            .collect())
    }

    async fn update(&self, comment: &Comment) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.comments.contains_key(&comment.id) {
            return Err(CoreError::not_found("Comment", comment.id));
        }
        inner.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn flags_for(&self, comment_id: CommentId) -> CoreResult<Vec<Flag>> {
        let inner = self.inner.lock().await;
        Ok(inner.flags.get(&comment_id).cloned().unwrap_or_default())
    }

    async fn has_flag_from(&self, comment_id: CommentId, user_id: UserId) -> CoreResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner
            .flags
            .get(&comment_id)
            .is_some_and(|flags| flags.iter().any(|f| f.raised_by == user_id)))
    }

    async fn create_flag_and_increment(&self, flag: Flag) -> CoreResult<Comment> {
        let mut inner = self.inner.lock().await;
        let comment = inner
            .comments
            .get(&flag.comment_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("Comment", flag.comment_id))?;

        // Invariant check inside the atomic unit; the service pre-check
        // cannot see a concurrent racer.
        let existing = inner.flags.entry(flag.comment_id).or_default();
        if existing.iter().any(|f| f.raised_by == flag.raised_by) {
            return Err(CoreError::Conflict(
                "You have already flagged this comment".to_string(),
            ));
        }

        let mut updated = comment;
        updated.flag_count += 1;
        updated.is_flagged = true;
        updated.updated_at = flag.created_at;
        existing.push(flag);
        inner.comments.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn clear_flags(&self, comment_id: CommentId) -> CoreResult<Comment> {
        let mut inner = self.inner.lock().await;
        let mut updated = inner
            .comments
            .get(&comment_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;

        inner.flags.remove(&comment_id);
        updated.flag_count = 0;
        updated.is_flagged = false;
        updated.updated_at = chrono::Utc::now();
        inner.comments.insert(comment_id, updated.clone());
        Ok(updated)
    }

    async fn soft_delete_and_clear_flags(&self, comment_id: CommentId) -> CoreResult<Comment> {
        let mut inner = self.inner.lock().await;
        let mut updated = inner
            .comments
            .get(&comment_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;

        inner.flags.remove(&comment_id);
        let now = chrono::Utc::now();
        updated.deleted_at = Some(now);
        updated.flag_count = 0;
        updated.is_flagged = false;
        updated.updated_at = now;
        inner.comments.insert(comment_id, updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl SlugGenerator for MemoryStore {
    /// Reserve and return a slug unique against everything seen so far.
    /// Collisions get a numeric suffix: `title`, `title-2`, `title-3`.
    async fn unique_slug(&self, base: &str) -> CoreResult<String> {
        let mut inner = self.inner.lock().await;
        let mut candidate = base.to_string();
        let mut n = 2;
        while inner.slugs.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        inner.slugs.insert(candidate.clone());
        Ok(candidate)
    }
}

/// Role lookup backed by a map.
#[derive(Default)]
pub struct MemoryAuthorizer {
    roles: RwLock<HashMap<UserId, Role>>,
}

impl MemoryAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a role to a user (replacing any previous one).
    pub async fn grant(&self, user_id: UserId, role: Role) {
        self.roles.write().await.insert(user_id, role);
    }
}

#[async_trait]
impl Authorizer for MemoryAuthorizer {
    async fn role_of(&self, user_id: UserId) -> CoreResult<Option<Role>> {
        Ok(self.roles.read().await.get(&user_id).copied())
    }
}
