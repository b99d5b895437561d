use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::application::actions::{
    ActionError, Actor, Validator, normalize_optional, parse_id, parse_requested_status,
    parse_status, require_admin, slug_issue, target_id,
};
use crate::application::repos::{
    DeletedCategory, HubChanges, HubsRepo, HubsWriteRepo, NewHub, RepoError,
};
use crate::cache::{CacheEvent, CacheKey, CacheTag, CacheTrigger};
use crate::domain::entities::{HubCategoryRecord, HubRecord};
use crate::domain::slug::generate_slug_today;
use crate::domain::types::HubStatus;

const NAME_MAX: usize = 120;

/// Payload of the hub editor. A non-empty `id` selects update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HubInput {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub status: Option<String>,
    pub category_id: String,
}

/// Payload of the hub category editor. A non-empty `id` selects update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HubCategoryInput {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Clone)]
pub struct HubService {
    reader: Arc<dyn HubsRepo>,
    writer: Arc<dyn HubsWriteRepo>,
    trigger: CacheTrigger,
}

impl HubService {
    pub fn new(
        reader: Arc<dyn HubsRepo>,
        writer: Arc<dyn HubsWriteRepo>,
        trigger: CacheTrigger,
    ) -> Self {
        Self {
            reader,
            writer,
            trigger,
        }
    }

    pub async fn hub_by_id(&self, id: Uuid) -> Result<Option<HubRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("hub-by-id", id),
                vec![CacheTag::HubById(id)],
                || async move { reader.find_hub_by_id(id).await },
            )
            .await
    }

    pub async fn hub_by_slug(&self, slug: &str) -> Result<Option<HubRecord>, RepoError> {
        let reader = self.reader.clone();
        let owned = slug.to_string();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("hub-by-slug", slug),
                vec![CacheTag::HubBySlug(slug.to_string())],
                || async move { reader.find_hub_by_slug(&owned).await },
            )
            .await
    }

    /// All hubs, active first, then upcoming, then inactive.
    pub async fn hubs(&self) -> Result<Vec<HubRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(CacheKey::new("hubs"), vec![CacheTag::Hubs], || async move {
                reader.list_hubs(None).await.map(sort_for_display)
            })
            .await
    }

    pub async fn hubs_in_category(&self, category_id: Uuid) -> Result<Vec<HubRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("hubs-by-category", category_id),
                vec![CacheTag::HubCategoryById(category_id), CacheTag::Hubs],
                || async move { reader.list_hubs(Some(category_id)).await.map(sort_for_display) },
            )
            .await
    }

    pub async fn categories(&self) -> Result<Vec<HubCategoryRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::new("hub-categories"),
                vec![CacheTag::HubCategories],
                || async move { reader.list_categories().await },
            )
            .await
    }

    pub async fn category_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<HubCategoryRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("hub-category-by-id", id),
                vec![CacheTag::HubCategoryById(id)],
                || async move { reader.find_category_by_id(id).await },
            )
            .await
    }

    pub async fn category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<HubCategoryRecord>, RepoError> {
        let reader = self.reader.clone();
        let owned = slug.to_string();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("hub-category-by-slug", slug),
                vec![CacheTag::HubCategoryBySlug(slug.to_string())],
                || async move { reader.find_category_by_slug(&owned).await },
            )
            .await
    }

    pub async fn save_hub(
        &self,
        actor: Option<&Actor>,
        input: HubInput,
    ) -> Result<HubRecord, ActionError> {
        require_admin(actor)?;
        let requested = parse_requested_status::<HubStatus>(input.status.as_deref())?;
        let target = target_id(input.id.as_deref())?;
        let category_id = parse_id(&input.category_id)?;
        let image = normalize_optional(input.image);
        let link = normalize_optional(input.link);

        Validator::new()
            .required("name", &input.name, NAME_MAX)
            .required("description", &input.description, usize::MAX)
            .image("image", image.as_deref())
            .url("link", link.as_deref())
            .finish()?;

        if self.reader.find_category_by_id(category_id).await?.is_none() {
            return Err(ActionError::field("category_id", "unknown hub category"));
        }

        let name = input.name.trim().to_string();

        let (hub, previous_category_id) = match target {
            None => {
                let slug = generate_slug_today(&name).map_err(|err| slug_issue(err, "name"))?;
                let hub = self
                    .writer
                    .create_hub(NewHub {
                        slug,
                        name,
                        description: input.description,
                        image,
                        link,
                        status: requested.unwrap_or(HubStatus::Active),
                        category_id,
                    })
                    .await?;
                (hub, None)
            }
            Some(id) => {
                let existing = self
                    .reader
                    .find_hub_by_id(id)
                    .await?
                    .ok_or(ActionError::NotFound("hub"))?;
                let hub = self
                    .writer
                    .update_hub(HubChanges {
                        id,
                        name,
                        description: input.description,
                        image,
                        link,
                        status: requested.unwrap_or(existing.status),
                        category_id,
                    })
                    .await?;
                let previous = Some(existing.category_id).filter(|prev| *prev != hub.category_id);
                (hub, previous)
            }
        };

        self.trigger.publish(CacheEvent::HubUpserted {
            hub_id: hub.id,
            slug: hub.slug.clone(),
            category_id: hub.category_id,
            previous_category_id,
        });
        Ok(hub)
    }

    pub async fn set_hub_status(
        &self,
        actor: Option<&Actor>,
        id: &str,
        status: &str,
    ) -> Result<HubRecord, ActionError> {
        require_admin(actor)?;
        let status: HubStatus = parse_status(status)?;
        let id = parse_id(id)?;

        let hub = self.writer.update_hub_status(id, status).await?;
        self.trigger.publish(CacheEvent::HubUpserted {
            hub_id: hub.id,
            slug: hub.slug.clone(),
            category_id: hub.category_id,
            previous_category_id: None,
        });
        Ok(hub)
    }

    pub async fn delete_hub(
        &self,
        actor: Option<&Actor>,
        id: &str,
    ) -> Result<HubRecord, ActionError> {
        require_admin(actor)?;
        let id = parse_id(id)?;

        let hub = self.writer.delete_hub(id).await?;
        self.trigger.publish(CacheEvent::HubDeleted {
            hub_id: hub.id,
            slug: hub.slug.clone(),
            category_id: hub.category_id,
        });
        Ok(hub)
    }

    pub async fn save_category(
        &self,
        actor: Option<&Actor>,
        input: HubCategoryInput,
    ) -> Result<HubCategoryRecord, ActionError> {
        require_admin(actor)?;
        let target = target_id(input.id.as_deref())?;
        Validator::new()
            .required("name", &input.name, NAME_MAX)
            .finish()?;
        let name = input.name.trim().to_string();

        let category = match target {
            None => {
                let slug = generate_slug_today(&name).map_err(|err| slug_issue(err, "name"))?;
                self.writer.create_category(slug, name).await?
            }
            Some(id) => self.writer.update_category(id, name).await?,
        };

        self.trigger.publish(CacheEvent::HubCategoryUpserted {
            category_id: category.id,
            slug: category.slug.clone(),
        });
        Ok(category)
    }

    /// Delete a category and, with it, every hub it holds.
    pub async fn delete_category(
        &self,
        actor: Option<&Actor>,
        id: &str,
    ) -> Result<HubCategoryRecord, ActionError> {
        require_admin(actor)?;
        let id = parse_id(id)?;

        let DeletedCategory { category, hubs } = self.writer.delete_category(id).await?;
        self.trigger.publish(CacheEvent::HubCategoryDeleted {
            category_id: category.id,
            slug: category.slug.clone(),
            hubs: hubs.into_iter().map(|hub| (hub.id, hub.slug)).collect(),
        });
        Ok(category)
    }
}

fn sort_for_display(mut hubs: Vec<HubRecord>) -> Vec<HubRecord> {
    hubs.sort_by(|a, b| {
        a.status
            .display_rank()
            .cmp(&b.status.display_rank())
            .then_with(|| a.name.cmp(&b.name))
    });
    hubs
}
