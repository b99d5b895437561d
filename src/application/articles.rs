use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::application::actions::{
    ActionError, Actor, Validator, normalize_optional, optional_id, parse_id,
    parse_requested_status, parse_status, permitted_status, require_actor, require_admin,
    slug_issue, target_id,
};
use crate::application::repos::{
    ArticleChanges, ArticleFilter, ArticlesRepo, ArticlesWriteRepo, NewArticle, RepoError,
};
use crate::cache::{CacheEvent, CacheKey, CacheTag, CacheTrigger};
use crate::domain::entities::{ArticleCard, ArticleRecord};
use crate::domain::slug::generate_slug_today;
use crate::domain::types::ContentStatus;

const TITLE_MAX: usize = 200;

/// Payload of the article editor. A non-empty `id` selects update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArticleInput {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub status: Option<String>,
    pub community_id: Option<String>,
}

#[derive(Clone)]
pub struct ArticleService {
    reader: Arc<dyn ArticlesRepo>,
    writer: Arc<dyn ArticlesWriteRepo>,
    trigger: CacheTrigger,
}

impl ArticleService {
    pub fn new(
        reader: Arc<dyn ArticlesRepo>,
        writer: Arc<dyn ArticlesWriteRepo>,
        trigger: CacheTrigger,
    ) -> Self {
        Self {
            reader,
            writer,
            trigger,
        }
    }

    pub async fn article_by_id(&self, id: Uuid) -> Result<Option<ArticleRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("article-by-id", id),
                vec![CacheTag::ArticleById(id)],
                || async move { reader.find_article_by_id(id).await },
            )
            .await
    }

    pub async fn article_by_slug(&self, slug: &str) -> Result<Option<ArticleRecord>, RepoError> {
        let reader = self.reader.clone();
        let owned = slug.to_string();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("article-by-slug", slug),
                vec![CacheTag::ArticleBySlug(slug.to_string())],
                || async move { reader.find_article_by_slug(&owned).await },
            )
            .await
    }

    /// Article by id as `viewer` may see it. Unpublished articles are visible
    /// to their author and admins only.
    pub async fn visible_article_by_id(
        &self,
        viewer: Option<&Actor>,
        id: Uuid,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        Ok(self.article_by_id(id).await?.filter(|article| {
            article.status.is_public()
                || viewer.is_some_and(|actor| actor.can_edit(article.author_id))
        }))
    }

    /// Published article with the given slug; drafts and banned articles are hidden.
    pub async fn public_article(&self, slug: &str) -> Result<Option<ArticleRecord>, RepoError> {
        Ok(self
            .article_by_slug(slug)
            .await?
            .filter(|article| article.status.is_public()))
    }

    pub async fn published_articles(&self) -> Result<Vec<ArticleCard>, RepoError> {
        self.cached_cards(
            CacheKey::new("articles-published"),
            vec![CacheTag::PublishedArticles, CacheTag::Articles],
            ArticleFilter {
                status: Some(ContentStatus::Published),
                ..ArticleFilter::default()
            },
        )
        .await
    }

    /// Every article regardless of status, for the dashboard.
    pub async fn all_articles(&self) -> Result<Vec<ArticleCard>, RepoError> {
        self.cached_cards(
            CacheKey::new("articles"),
            vec![CacheTag::Articles],
            ArticleFilter::default(),
        )
        .await
    }

    pub async fn published_articles_by_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<ArticleCard>, RepoError> {
        self.cached_cards(
            CacheKey::with("articles-by-author", author_id),
            vec![CacheTag::UserArticles(author_id), CacheTag::Articles],
            ArticleFilter {
                status: Some(ContentStatus::Published),
                author_id: Some(author_id),
                ..ArticleFilter::default()
            },
        )
        .await
    }

    pub async fn published_articles_by_community(
        &self,
        community_id: Uuid,
    ) -> Result<Vec<ArticleCard>, RepoError> {
        self.cached_cards(
            CacheKey::with("articles-by-community", community_id),
            vec![
                CacheTag::CommunityArticles(community_id),
                CacheTag::PublishedArticles,
            ],
            ArticleFilter {
                status: Some(ContentStatus::Published),
                community_id: Some(community_id),
                ..ArticleFilter::default()
            },
        )
        .await
    }

    async fn cached_cards(
        &self,
        key: CacheKey,
        tags: Vec<CacheTag>,
        filter: ArticleFilter,
    ) -> Result<Vec<ArticleCard>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(key, tags, || async move {
                reader.list_article_cards(&filter).await
            })
            .await
    }

    /// Create or update an article owned by the actor.
    pub async fn save_article(
        &self,
        actor: Option<&Actor>,
        input: ArticleInput,
    ) -> Result<ArticleRecord, ActionError> {
        let actor = require_actor(actor)?;
        let requested = parse_requested_status::<ContentStatus>(input.status.as_deref())?;
        let target = target_id(input.id.as_deref())?;
        let community_id = optional_id(input.community_id.as_deref())?;
        let thumbnail = normalize_optional(input.thumbnail);

        Validator::new()
            .required("title", &input.title, TITLE_MAX)
            .required("content", &input.content, usize::MAX)
            .image("thumbnail", thumbnail.as_deref())
            .finish()?;

        let title = input.title.trim().to_string();
        let content = input.content;

        let (article, previous_community_id) = match target {
            None => {
                let status = permitted_status(actor, requested, ContentStatus::Draft)?;
                let slug = generate_slug_today(&title).map_err(|err| slug_issue(err, "title"))?;
                let article = self
                    .writer
                    .create_article(NewArticle {
                        slug,
                        title,
                        content,
                        thumbnail,
                        status,
                        author_id: actor.user_id,
                        community_id,
                    })
                    .await?;
                (article, None)
            }
            Some(id) => {
                let existing = self
                    .reader
                    .find_article_by_id(id)
                    .await?
                    .ok_or(ActionError::NotFound("article"))?;
                if !actor.can_edit(existing.author_id) {
                    return Err(ActionError::Unauthorized);
                }
                let status = permitted_status(actor, requested, existing.status)?;
                let article = self
                    .writer
                    .update_article(ArticleChanges {
                        id,
                        title,
                        content,
                        thumbnail,
                        status,
                        community_id,
                    })
                    .await?;
                let previous = existing
                    .community_id
                    .filter(|previous| Some(*previous) != article.community_id);
                (article, previous)
            }
        };

        self.trigger.publish(CacheEvent::ArticleUpserted {
            article_id: article.id,
            slug: article.slug.clone(),
            author_id: article.author_id,
            community_id: article.community_id,
            previous_community_id,
        });
        Ok(article)
    }

    /// Moderation: set any status. Admin only.
    pub async fn set_article_status(
        &self,
        actor: Option<&Actor>,
        id: &str,
        status: &str,
    ) -> Result<ArticleRecord, ActionError> {
        require_admin(actor)?;
        let status: ContentStatus = parse_status(status)?;
        let id = parse_id(id)?;

        let article = self.writer.update_article_status(id, status).await?;
        self.trigger.publish(CacheEvent::ArticleUpserted {
            article_id: article.id,
            slug: article.slug.clone(),
            author_id: article.author_id,
            community_id: article.community_id,
            previous_community_id: None,
        });
        Ok(article)
    }

    pub async fn delete_article(
        &self,
        actor: Option<&Actor>,
        id: &str,
    ) -> Result<ArticleRecord, ActionError> {
        let actor = require_actor(actor)?;
        let id = parse_id(id)?;
        let existing = self
            .reader
            .find_article_by_id(id)
            .await?
            .ok_or(ActionError::NotFound("article"))?;
        if !actor.can_edit(existing.author_id) {
            return Err(ActionError::Unauthorized);
        }

        let article = self.writer.delete_article(id).await?;
        self.trigger.publish(CacheEvent::ArticleDeleted {
            article_id: article.id,
            slug: article.slug.clone(),
            author_id: article.author_id,
            community_id: article.community_id,
        });
        Ok(article)
    }
}
