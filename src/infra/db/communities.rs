use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        CommunitiesRepo, CommunitiesWriteRepo, CommunityChanges, NewCommunity, RepoError,
    },
    domain::entities::CommunityRecord,
    domain::types::ReviewStatus,
};

use super::PostgresRepositories;
use super::util::{map_sqlx_error, require_row};

const COMMUNITY_COLUMNS: &str = "id, user_id, slug, name, description, image, location, \
     category, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CommunityRow {
    id: Uuid,
    user_id: Uuid,
    slug: String,
    name: String,
    description: String,
    image: Option<String>,
    location: Option<String>,
    category: String,
    status: ReviewStatus,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CommunityRow> for CommunityRecord {
    fn from(row: CommunityRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            slug: row.slug,
            name: row.name,
            description: row.description,
            image: row.image,
            location: row.location,
            category: row.category,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CommunitiesRepo for PostgresRepositories {
    async fn find_community_by_id(&self, id: Uuid) -> Result<Option<CommunityRecord>, RepoError> {
        let row = sqlx::query_as::<_, CommunityRow>(&format!(
            "SELECT {COMMUNITY_COLUMNS} FROM communities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CommunityRecord::from))
    }

    async fn find_community_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CommunityRecord>, RepoError> {
        let row = sqlx::query_as::<_, CommunityRow>(&format!(
            "SELECT {COMMUNITY_COLUMNS} FROM communities WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CommunityRecord::from))
    }

    async fn find_community_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CommunityRecord>, RepoError> {
        let row = sqlx::query_as::<_, CommunityRow>(&format!(
            "SELECT {COMMUNITY_COLUMNS} FROM communities WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CommunityRecord::from))
    }

    async fn list_communities(
        &self,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<CommunityRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COMMUNITY_COLUMNS} FROM communities "
        ));
        if let Some(status) = status {
            qb.push(" WHERE status = ");
            qb.push_bind(status);
        }
        qb.push(" ORDER BY LOWER(name), slug");

        let rows = qb
            .build_query_as::<CommunityRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(CommunityRecord::from).collect())
    }
}

#[async_trait]
impl CommunitiesWriteRepo for PostgresRepositories {
    async fn create_community(&self, params: NewCommunity) -> Result<CommunityRecord, RepoError> {
        let NewCommunity {
            user_id,
            slug,
            name,
            description,
            image,
            location,
            category,
            status,
        } = params;

        let row = sqlx::query_as::<_, CommunityRow>(&format!(
            "INSERT INTO communities (id, user_id, slug, name, description, image, location, \
             category, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10) \
             RETURNING {COMMUNITY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(slug)
        .bind(name)
        .bind(description)
        .bind(image)
        .bind(location)
        .bind(category)
        .bind(status)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CommunityRecord::from(row))
    }

    async fn update_community(
        &self,
        params: CommunityChanges,
    ) -> Result<CommunityRecord, RepoError> {
        let CommunityChanges {
            id,
            name,
            description,
            image,
            location,
            category,
        } = params;

        let row = sqlx::query_as::<_, CommunityRow>(&format!(
            "UPDATE communities SET name = $2, description = $3, image = $4, location = $5, \
             category = $6, updated_at = $7 \
             WHERE id = $1 \
             RETURNING {COMMUNITY_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(image)
        .bind(location)
        .bind(category)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(CommunityRecord::from)
    }

    async fn update_community_status(
        &self,
        id: Uuid,
        status: ReviewStatus,
    ) -> Result<CommunityRecord, RepoError> {
        let row = sqlx::query_as::<_, CommunityRow>(&format!(
            "UPDATE communities SET status = $2, updated_at = $3 WHERE id = $1 \
             RETURNING {COMMUNITY_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(CommunityRecord::from)
    }
}
