//! Article publishing workflow.
//!
//! Every operation is load -> validate -> gate -> mutate -> persist;
//! the whole field update lands in one `ArticleStore::update` call.
//! Authorization failures are `CoreError::Forbidden` so the boundary
//! can map them to a 403 rather than a 400.

use std::sync::Arc;

use masthead_core::error::{CoreError, CoreResult};
use masthead_core::publishing::{
    duplicate_title, state_machine, validate_reject_feedback, Article, ArticleStatus,
};
use masthead_core::slug::slugify;
use masthead_core::types::{ArticleId, UserId};

use crate::ports::{ArticleStore, Authorizer, SlugGenerator};

/// Gated article lifecycle transitions.
pub struct PublishingService {
    store: Arc<dyn ArticleStore>,
    auth: Arc<dyn Authorizer>,
    slugs: Arc<dyn SlugGenerator>,
}

impl PublishingService {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        auth: Arc<dyn Authorizer>,
        slugs: Arc<dyn SlugGenerator>,
    ) -> Self {
        Self { store, auth, slugs }
    }

    /// Author-side transition into review. Clears any previous review
    /// decision, so a resubmitted rejection starts clean.
    pub async fn submit(&self, article_id: ArticleId, actor: UserId) -> CoreResult<Article> {
        let mut article = self.load(article_id).await?;
        self.require_edit_capability(actor, article.author_id).await?;
        state_machine::validate_transition(article.status, ArticleStatus::Submitted)?;

        article.status = ArticleStatus::Submitted;
        article.clear_review_fields();
        article.updated_at = chrono::Utc::now();
        self.store.update(&article).await?;

        tracing::info!(article_id = %article.id, actor = %actor, "Article submitted for review");
        Ok(article)
    }

    /// Record an editorial approval. Sets the review fields; does not
    /// itself publish.
    pub async fn approve(
        &self,
        article_id: ArticleId,
        actor: UserId,
        feedback: Option<String>,
    ) -> CoreResult<Article> {
        self.require_moderator(actor).await?;
        let mut article = self.load(article_id).await?;
        if !article.status.is_pre_publish() {
            return Err(CoreError::Conflict(format!(
                "Cannot review an article in status {:?}",
                article.status
            )));
        }

        article.status = ArticleStatus::Approved;
        self.stamp_review(&mut article, actor, feedback);
        self.store.update(&article).await?;

        tracing::info!(article_id = %article.id, reviewer = %actor, "Article approved");
        Ok(article)
    }

    /// Record an editorial rejection. Feedback is mandatory; its absence
    /// is a validation error and no transition happens.
    pub async fn reject(
        &self,
        article_id: ArticleId,
        actor: UserId,
        feedback: Option<String>,
    ) -> CoreResult<Article> {
        self.require_moderator(actor).await?;
        validate_reject_feedback(feedback.as_deref())?;
        let mut article = self.load(article_id).await?;
        if !article.status.is_pre_publish() {
            return Err(CoreError::Conflict(format!(
                "Cannot review an article in status {:?}",
                article.status
            )));
        }

        article.status = ArticleStatus::Rejected;
        self.stamp_review(&mut article, actor, feedback);
        self.store.update(&article).await?;

        tracing::info!(article_id = %article.id, reviewer = %actor, "Article rejected");
        Ok(article)
    }

    /// Make the article live. `published_at` is set on first publish
    /// only; republishing keeps the original publication date.
    pub async fn publish(&self, article_id: ArticleId, actor: UserId) -> CoreResult<Article> {
        self.require_moderator(actor).await?;
        let mut article = self.load(article_id).await?;
        state_machine::validate_transition(article.status, ArticleStatus::Published)?;

        article.status = ArticleStatus::Published;
        if article.published_at.is_none() {
            article.published_at = Some(chrono::Utc::now());
        }
        article.updated_at = chrono::Utc::now();
        self.store.update(&article).await?;

        tracing::info!(article_id = %article.id, actor = %actor, "Article published");
        Ok(article)
    }

    /// Take the article off the site, back to `Draft`. The original
    /// publication date is kept.
    pub async fn unpublish(&self, article_id: ArticleId, actor: UserId) -> CoreResult<Article> {
        self.require_moderator(actor).await?;
        let mut article = self.load(article_id).await?;
        if article.status != ArticleStatus::Published {
            return Err(CoreError::Conflict(format!(
                "Only a published article can be unpublished (status is {:?})",
                article.status
            )));
        }

        article.status = ArticleStatus::Draft;
        article.updated_at = chrono::Utc::now();
        self.store.update(&article).await?;

        tracing::info!(article_id = %article.id, actor = %actor, "Article unpublished");
        Ok(article)
    }

    /// Shelve the article. Terminal.
    pub async fn archive(&self, article_id: ArticleId, actor: UserId) -> CoreResult<Article> {
        self.require_moderator(actor).await?;
        let mut article = self.load(article_id).await?;
        state_machine::validate_transition(article.status, ArticleStatus::Archived)?;

        article.status = ArticleStatus::Archived;
        article.updated_at = chrono::Utc::now();
        self.store.update(&article).await?;

        tracing::info!(article_id = %article.id, actor = %actor, "Article archived");
        Ok(article)
    }

    /// Create a fresh draft copy owned by the actor: stats, publication
    /// date, and review fields reset, slug regenerated from the copy
    /// title.
    pub async fn duplicate(&self, article_id: ArticleId, actor: UserId) -> CoreResult<Article> {
        let original = self.load(article_id).await?;
        self.require_edit_capability(actor, original.author_id).await?;

        let title = duplicate_title(&original.title);
        let slug = self.slugs.unique_slug(&slugify(&title)).await?;
        let copy = Article::new_draft(actor, title, slug);
        self.store.insert(&copy).await?;

        tracing::info!(
            original_id = %original.id,
            copy_id = %copy.id,
            actor = %actor,
            "Article duplicated"
        );
        Ok(copy)
    }

    // -----------------------------------------------------------------------
    // Gates and helpers
    // -----------------------------------------------------------------------

    async fn load(&self, article_id: ArticleId) -> CoreResult<Article> {
        self.store
            .find(article_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Article", article_id))
    }

    async fn require_moderator(&self, actor: UserId) -> CoreResult<()> {
        match self.auth.role_of(actor).await? {
            Some(role) if role.can_moderate() => Ok(()),
            _ => Err(CoreError::Forbidden(
                "Editor or admin role required".to_string(),
            )),
        }
    }

    /// Edit capability: the author themselves, or an editor/admin.
    async fn require_edit_capability(&self, actor: UserId, author_id: UserId) -> CoreResult<()> {
        if actor == author_id {
            return Ok(());
        }
        self.require_moderator(actor).await.map_err(|_| {
            CoreError::Forbidden("Only the author or an editor may do this".to_string())
        })
    }

    fn stamp_review(&self, article: &mut Article, reviewer: UserId, feedback: Option<String>) {
        let now = chrono::Utc::now();
        article.reviewed_by = Some(reviewer);
        article.reviewed_at = Some(now);
        article.review_notes = feedback;
        article.updated_at = now;
    }
}
