use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        NewProduct, ProductChanges, ProductFilter, ProductsRepo, ProductsWriteRepo, RepoError,
    },
    domain::entities::ProductRecord,
    domain::types::ContentStatus,
};

use super::PostgresRepositories;
use super::util::{map_sqlx_error, require_row};

const PRODUCT_COLUMNS: &str = "id, slug, name, description, image, category, price, link, \
     status, talent_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    slug: String,
    name: String,
    description: String,
    image: Option<String>,
    category: String,
    price: i64,
    link: Option<String>,
    status: ContentStatus,
    talent_id: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            description: row.description,
            image: row.image,
            category: row.category,
            price: row.price,
            link: row.link,
            status: row.status,
            talent_id: row.talent_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProductRecord::from))
    }

    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<ProductRecord>, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProductRecord::from))
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE 1=1 "
        ));
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        if let Some(talent_id) = filter.talent_id {
            qb.push(" AND talent_id = ");
            qb.push_bind(talent_id);
        }
        qb.push(" ORDER BY created_at DESC, id DESC");

        let rows = qb
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }
}

#[async_trait]
impl ProductsWriteRepo for PostgresRepositories {
    async fn create_product(&self, params: NewProduct) -> Result<ProductRecord, RepoError> {
        let NewProduct {
            slug,
            name,
            description,
            image,
            category,
            price,
            link,
            status,
            talent_id,
        } = params;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (id, slug, name, description, image, category, price, link, \
             status, talent_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(name)
        .bind(description)
        .bind(image)
        .bind(category)
        .bind(price)
        .bind(link)
        .bind(status)
        .bind(talent_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ProductRecord::from(row))
    }

    async fn update_product(&self, params: ProductChanges) -> Result<ProductRecord, RepoError> {
        let ProductChanges {
            id,
            name,
            description,
            image,
            category,
            price,
            link,
            status,
        } = params;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET name = $2, description = $3, image = $4, category = $5, \
             price = $6, link = $7, status = $8, updated_at = $9 \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(image)
        .bind(category)
        .bind(price)
        .bind(link)
        .bind(status)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(ProductRecord::from)
    }

    async fn update_product_status(
        &self,
        id: Uuid,
        status: ContentStatus,
    ) -> Result<ProductRecord, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET status = $2, updated_at = $3 WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(ProductRecord::from)
    }

    async fn delete_product(&self, id: Uuid) -> Result<ProductRecord, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        require_row(row).map(ProductRecord::from)
    }
}
