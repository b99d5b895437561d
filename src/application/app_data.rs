use std::sync::Arc;

use serde::Deserialize;

use crate::application::actions::{ActionError, Actor, Validator, require_admin};
use crate::application::repos::{AppDataRepo, RepoError};
use crate::cache::{CacheEvent, CacheKey, CacheTag, CacheTrigger};
use crate::domain::entities::AppDataRecord;

const FIELD_MAX: usize = 500;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppDataInput {
    pub title: String,
    pub description: String,
    pub logo: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub instagram: String,
    pub whatsapp: String,
}

impl AppDataInput {
    fn into_record(self) -> AppDataRecord {
        AppDataRecord {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            logo: self.logo.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            instagram: self.instagram.trim().to_string(),
            whatsapp: self.whatsapp.trim().to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppDataService {
    repo: Arc<dyn AppDataRepo>,
    trigger: CacheTrigger,
}

impl AppDataService {
    pub fn new(repo: Arc<dyn AppDataRepo>, trigger: CacheTrigger) -> Self {
        Self { repo, trigger }
    }

    /// Site settings; an all-empty record when none were ever saved.
    pub async fn load(&self) -> Result<AppDataRecord, RepoError> {
        let repo = self.repo.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::new("app-data"),
                vec![CacheTag::AppData],
                || async move { repo.load_app_data().await.map(Option::unwrap_or_default) },
            )
            .await
    }

    pub async fn save(
        &self,
        actor: Option<&Actor>,
        input: AppDataInput,
    ) -> Result<AppDataRecord, ActionError> {
        require_admin(actor)?;
        let record = input.into_record();

        let mut validator = Validator::new();
        for (field, value) in [
            ("title", &record.title),
            ("description", &record.description),
            ("address", &record.address),
        ] {
            validator.max_len(field, Some(value.as_str()), FIELD_MAX);
        }
        validator.email("email", &record.email);
        if !record.logo.is_empty() {
            validator.image("logo", Some(record.logo.as_str()));
        }
        validator.finish()?;

        let saved = self.repo.save_app_data(record).await?;
        self.trigger.publish(CacheEvent::AppDataUpdated);
        Ok(saved)
    }
}
