use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{NewTalent, RepoError, TalentChanges, TalentsRepo, TalentsWriteRepo},
    domain::entities::TalentRecord,
    domain::types::ReviewStatus,
};

use super::PostgresRepositories;
use super::util::{map_sqlx_error, require_row};

const TALENT_COLUMNS: &str = "id, user_id, slug, name, profession, industry, description, \
     image, social_link, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TalentRow {
    id: Uuid,
    user_id: Uuid,
    slug: String,
    name: String,
    profession: String,
    industry: String,
    description: Option<String>,
    image: Option<String>,
    social_link: Option<String>,
    status: ReviewStatus,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<TalentRow> for TalentRecord {
    fn from(row: TalentRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            slug: row.slug,
            name: row.name,
            profession: row.profession,
            industry: row.industry,
            description: row.description,
            image: row.image,
            social_link: row.social_link,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TalentsRepo for PostgresRepositories {
    async fn find_talent_by_id(&self, id: Uuid) -> Result<Option<TalentRecord>, RepoError> {
        let row = sqlx::query_as::<_, TalentRow>(&format!(
            "SELECT {TALENT_COLUMNS} FROM talents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(TalentRecord::from))
    }

    async fn find_talent_by_slug(&self, slug: &str) -> Result<Option<TalentRecord>, RepoError> {
        let row = sqlx::query_as::<_, TalentRow>(&format!(
            "SELECT {TALENT_COLUMNS} FROM talents WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(TalentRecord::from))
    }

    async fn find_talent_by_user(&self, user_id: Uuid) -> Result<Option<TalentRecord>, RepoError> {
        let row = sqlx::query_as::<_, TalentRow>(&format!(
            "SELECT {TALENT_COLUMNS} FROM talents WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(TalentRecord::from))
    }

    async fn list_talents(
        &self,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<TalentRecord>, RepoError> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {TALENT_COLUMNS} FROM talents "));
        if let Some(status) = status {
            qb.push(" WHERE status = ");
            qb.push_bind(status);
        }
        qb.push(" ORDER BY LOWER(name), slug");

        let rows = qb
            .build_query_as::<TalentRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(TalentRecord::from).collect())
    }
}

#[async_trait]
impl TalentsWriteRepo for PostgresRepositories {
    async fn create_talent(&self, params: NewTalent) -> Result<TalentRecord, RepoError> {
        let NewTalent {
            user_id,
            slug,
            name,
            profession,
            industry,
            description,
            image,
            social_link,
            status,
        } = params;

        let row = sqlx::query_as::<_, TalentRow>(&format!(
            "INSERT INTO talents (id, user_id, slug, name, profession, industry, description, \
             image, social_link, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11) \
             RETURNING {TALENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(slug)
        .bind(name)
        .bind(profession)
        .bind(industry)
        .bind(description)
        .bind(image)
        .bind(social_link)
        .bind(status)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(TalentRecord::from(row))
    }

    async fn update_talent(&self, params: TalentChanges) -> Result<TalentRecord, RepoError> {
        let TalentChanges {
            id,
            name,
            profession,
            industry,
            description,
            image,
            social_link,
        } = params;

        let row = sqlx::query_as::<_, TalentRow>(&format!(
            "UPDATE talents SET name = $2, profession = $3, industry = $4, description = $5, \
             image = $6, social_link = $7, updated_at = $8 \
             WHERE id = $1 \
             RETURNING {TALENT_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(profession)
        .bind(industry)
        .bind(description)
        .bind(image)
        .bind(social_link)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(TalentRecord::from)
    }

    async fn update_talent_status(
        &self,
        id: Uuid,
        status: ReviewStatus,
    ) -> Result<TalentRecord, RepoError> {
        let row = sqlx::query_as::<_, TalentRow>(&format!(
            "UPDATE talents SET status = $2, updated_at = $3 WHERE id = $1 \
             RETURNING {TALENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(TalentRecord::from)
    }
}
