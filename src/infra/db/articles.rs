use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        ArticleChanges, ArticleFilter, ArticlesRepo, ArticlesWriteRepo, NewArticle, RepoError,
    },
    domain::entities::{ArticleCard, ArticleRecord, CommunityBadge, EXCERPT_CHARS},
    domain::types::{ContentStatus, ReviewStatus},
};

use super::PostgresRepositories;
use super::util::{map_sqlx_error, require_row};

const ARTICLE_COLUMNS: &str = "id, slug, title, content, thumbnail, status, author_id, \
     community_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: Uuid,
    slug: String,
    title: String,
    content: String,
    thumbnail: Option<String>,
    status: ContentStatus,
    author_id: Uuid,
    community_id: Option<Uuid>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ArticleRow> for ArticleRecord {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            content: row.content,
            thumbnail: row.thumbnail,
            status: row.status,
            author_id: row.author_id,
            community_id: row.community_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ArticleCardRow {
    id: Uuid,
    slug: String,
    title: String,
    excerpt: String,
    thumbnail: Option<String>,
    status: ContentStatus,
    author_id: Uuid,
    author_name: String,
    community_id: Option<Uuid>,
    community_slug: Option<String>,
    community_name: Option<String>,
    community_status: Option<ReviewStatus>,
    created_at: OffsetDateTime,
}

impl From<ArticleCardRow> for ArticleCard {
    fn from(row: ArticleCardRow) -> Self {
        let community = match (
            row.community_id,
            row.community_slug,
            row.community_name,
            row.community_status,
        ) {
            (Some(id), Some(slug), Some(name), Some(status)) => Some(CommunityBadge {
                id,
                slug,
                name,
                status,
            }),
            _ => None,
        };
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            excerpt: row.excerpt,
            thumbnail: row.thumbnail,
            status: row.status,
            author_id: row.author_id,
            author_name: row.author_name,
            community,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ArticlesRepo for PostgresRepositories {
    async fn find_article_by_id(&self, id: Uuid) -> Result<Option<ArticleRecord>, RepoError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ArticleRecord::from))
    }

    async fn find_article_by_slug(&self, slug: &str) -> Result<Option<ArticleRecord>, RepoError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ArticleRecord::from))
    }

    async fn list_article_cards(
        &self,
        filter: &ArticleFilter,
    ) -> Result<Vec<ArticleCard>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT a.id, a.slug, a.title, LEFT(a.content, {EXCERPT_CHARS}) AS excerpt, \
             a.thumbnail, a.status, a.author_id, u.name AS author_name, \
             c.id AS community_id, c.slug AS community_slug, c.name AS community_name, \
             c.status AS community_status, a.created_at \
             FROM articles a \
             INNER JOIN users u ON u.id = a.author_id \
             LEFT JOIN communities c ON c.id = a.community_id \
             WHERE 1=1 "
        ));

        if let Some(status) = filter.status {
            qb.push(" AND a.status = ");
            qb.push_bind(status);
        }
        if let Some(author_id) = filter.author_id {
            qb.push(" AND a.author_id = ");
            qb.push_bind(author_id);
        }
        if let Some(community_id) = filter.community_id {
            qb.push(" AND a.community_id = ");
            qb.push_bind(community_id);
        }
        qb.push(" ORDER BY a.created_at DESC, a.id DESC");

        let rows = qb
            .build_query_as::<ArticleCardRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ArticleCard::from).collect())
    }
}

#[async_trait]
impl ArticlesWriteRepo for PostgresRepositories {
    async fn create_article(&self, params: NewArticle) -> Result<ArticleRecord, RepoError> {
        let NewArticle {
            slug,
            title,
            content,
            thumbnail,
            status,
            author_id,
            community_id,
        } = params;

        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "INSERT INTO articles (id, slug, title, content, thumbnail, status, author_id, \
             community_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) \
             RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(title)
        .bind(content)
        .bind(thumbnail)
        .bind(status)
        .bind(author_id)
        .bind(community_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ArticleRecord::from(row))
    }

    async fn update_article(&self, params: ArticleChanges) -> Result<ArticleRecord, RepoError> {
        let ArticleChanges {
            id,
            title,
            content,
            thumbnail,
            status,
            community_id,
        } = params;

        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "UPDATE articles SET title = $2, content = $3, thumbnail = $4, status = $5, \
             community_id = $6, updated_at = $7 \
             WHERE id = $1 \
             RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(id)
        .bind(title)
        .bind(content)
        .bind(thumbnail)
        .bind(status)
        .bind(community_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(ArticleRecord::from)
    }

    async fn update_article_status(
        &self,
        id: Uuid,
        status: ContentStatus,
    ) -> Result<ArticleRecord, RepoError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "UPDATE articles SET status = $2, updated_at = $3 WHERE id = $1 \
             RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(ArticleRecord::from)
    }

    async fn delete_article(&self, id: Uuid) -> Result<ArticleRecord, RepoError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "DELETE FROM articles WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(ArticleRecord::from)
    }
}
