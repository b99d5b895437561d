use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        DeletedCategory, HubChanges, HubsRepo, HubsWriteRepo, NewHub, RepoError,
    },
    domain::entities::{HubCategoryRecord, HubRecord},
    domain::types::HubStatus,
};

use super::PostgresRepositories;
use super::util::{map_sqlx_error, require_row};

const HUB_COLUMNS: &str =
    "id, slug, name, description, image, link, status, category_id, created_at, updated_at";
const CATEGORY_COLUMNS: &str = "id, slug, name, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct HubRow {
    id: Uuid,
    slug: String,
    name: String,
    description: String,
    image: Option<String>,
    link: Option<String>,
    status: HubStatus,
    category_id: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<HubRow> for HubRecord {
    fn from(row: HubRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            description: row.description,
            image: row.image,
            link: row.link,
            status: row.status,
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    slug: String,
    name: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CategoryRow> for HubCategoryRecord {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl HubsRepo for PostgresRepositories {
    async fn find_hub_by_id(&self, id: Uuid) -> Result<Option<HubRecord>, RepoError> {
        let row = sqlx::query_as::<_, HubRow>(&format!(
            "SELECT {HUB_COLUMNS} FROM hubs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(HubRecord::from))
    }

    async fn find_hub_by_slug(&self, slug: &str) -> Result<Option<HubRecord>, RepoError> {
        let row = sqlx::query_as::<_, HubRow>(&format!(
            "SELECT {HUB_COLUMNS} FROM hubs WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(HubRecord::from))
    }

    async fn list_hubs(&self, category_id: Option<Uuid>) -> Result<Vec<HubRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {HUB_COLUMNS} FROM hubs "));
        if let Some(category_id) = category_id {
            qb.push(" WHERE category_id = ");
            qb.push_bind(category_id);
        }
        qb.push(" ORDER BY LOWER(name), slug");

        let rows = qb
            .build_query_as::<HubRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(HubRecord::from).collect())
    }

    async fn find_category_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<HubCategoryRecord>, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM hub_categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(HubCategoryRecord::from))
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<HubCategoryRecord>, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM hub_categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(HubCategoryRecord::from))
    }

    async fn list_categories(&self) -> Result<Vec<HubCategoryRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM hub_categories ORDER BY LOWER(name), slug"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(HubCategoryRecord::from).collect())
    }
}

#[async_trait]
impl HubsWriteRepo for PostgresRepositories {
    async fn create_hub(&self, params: NewHub) -> Result<HubRecord, RepoError> {
        let NewHub {
            slug,
            name,
            description,
            image,
            link,
            status,
            category_id,
        } = params;

        let row = sqlx::query_as::<_, HubRow>(&format!(
            "INSERT INTO hubs (id, slug, name, description, image, link, status, category_id, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) \
             RETURNING {HUB_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(name)
        .bind(description)
        .bind(image)
        .bind(link)
        .bind(status)
        .bind(category_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(HubRecord::from(row))
    }

    async fn update_hub(&self, params: HubChanges) -> Result<HubRecord, RepoError> {
        let HubChanges {
            id,
            name,
            description,
            image,
            link,
            status,
            category_id,
        } = params;

        let row = sqlx::query_as::<_, HubRow>(&format!(
            "UPDATE hubs SET name = $2, description = $3, image = $4, link = $5, status = $6, \
             category_id = $7, updated_at = $8 \
             WHERE id = $1 \
             RETURNING {HUB_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(image)
        .bind(link)
        .bind(status)
        .bind(category_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(HubRecord::from)
    }

    async fn update_hub_status(
        &self,
        id: Uuid,
        status: HubStatus,
    ) -> Result<HubRecord, RepoError> {
        let row = sqlx::query_as::<_, HubRow>(&format!(
            "UPDATE hubs SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {HUB_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(HubRecord::from)
    }

    async fn delete_hub(&self, id: Uuid) -> Result<HubRecord, RepoError> {
        let row = sqlx::query_as::<_, HubRow>(&format!(
            "DELETE FROM hubs WHERE id = $1 RETURNING {HUB_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(HubRecord::from)
    }

    async fn create_category(
        &self,
        slug: String,
        name: String,
    ) -> Result<HubCategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO hub_categories (id, slug, name, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(name)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(HubCategoryRecord::from(row))
    }

    async fn update_category(
        &self,
        id: Uuid,
        name: String,
    ) -> Result<HubCategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE hub_categories SET name = $2, updated_at = $3 WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(HubCategoryRecord::from)
    }

    async fn delete_category(&self, id: Uuid) -> Result<DeletedCategory, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        // The row lock holds off hub inserts into this category until commit.
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM hub_categories WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;
        require_row(locked)?;

        let hubs = sqlx::query_as::<_, HubRow>(&format!(
            "DELETE FROM hubs WHERE category_id = $1 RETURNING {HUB_COLUMNS}"
        ))
        .bind(id)
        .fetch_all(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        let category = sqlx::query_as::<_, CategoryRow>(&format!(
            "DELETE FROM hub_categories WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(DeletedCategory {
            category: HubCategoryRecord::from(category),
            hubs: hubs.into_iter().map(HubRecord::from).collect(),
        })
    }
}
