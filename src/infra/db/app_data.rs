use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{AppDataRepo, RepoError},
    domain::entities::AppDataRecord,
};

use super::PostgresRepositories;
use super::util::map_sqlx_error;

const APP_DATA_COLUMNS: &str =
    "title, description, logo, email, phone, address, instagram, whatsapp";

#[derive(sqlx::FromRow)]
struct AppDataRow {
    title: String,
    description: String,
    logo: String,
    email: String,
    phone: String,
    address: String,
    instagram: String,
    whatsapp: String,
}

impl From<AppDataRow> for AppDataRecord {
    fn from(row: AppDataRow) -> Self {
        Self {
            title: row.title,
            description: row.description,
            logo: row.logo,
            email: row.email,
            phone: row.phone,
            address: row.address,
            instagram: row.instagram,
            whatsapp: row.whatsapp,
        }
    }
}

#[async_trait]
impl AppDataRepo for PostgresRepositories {
    async fn load_app_data(&self) -> Result<Option<AppDataRecord>, RepoError> {
        let row = sqlx::query_as::<_, AppDataRow>(&format!(
            "SELECT {APP_DATA_COLUMNS} FROM app_data WHERE id = 1"
        ))
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(AppDataRecord::from))
    }

    async fn save_app_data(&self, record: AppDataRecord) -> Result<AppDataRecord, RepoError> {
        let AppDataRecord {
            title,
            description,
            logo,
            email,
            phone,
            address,
            instagram,
            whatsapp,
        } = record;

        let row = sqlx::query_as::<_, AppDataRow>(&format!(
            "INSERT INTO app_data (id, {APP_DATA_COLUMNS}, updated_at) \
             VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET \
                 title = EXCLUDED.title, \
                 description = EXCLUDED.description, \
                 logo = EXCLUDED.logo, \
                 email = EXCLUDED.email, \
                 phone = EXCLUDED.phone, \
                 address = EXCLUDED.address, \
                 instagram = EXCLUDED.instagram, \
                 whatsapp = EXCLUDED.whatsapp, \
                 updated_at = EXCLUDED.updated_at \
             RETURNING {APP_DATA_COLUMNS}"
        ))
        .bind(title)
        .bind(description)
        .bind(logo)
        .bind(email)
        .bind(phone)
        .bind(address)
        .bind(instagram)
        .bind(whatsapp)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(AppDataRecord::from(row))
    }
}
