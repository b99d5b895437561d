use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::application::actions::{
    ActionError, Actor, Validator, normalize_optional, parse_id, parse_requested_status,
    parse_status, permitted_status, require_actor, require_admin, slug_issue, target_id,
};
use crate::application::repos::{
    NewProduct, ProductChanges, ProductFilter, ProductsRepo, ProductsWriteRepo, RepoError,
    TalentsRepo,
};
use crate::cache::{CacheEvent, CacheKey, CacheTag, CacheTrigger};
use crate::domain::entities::{ProductRecord, TalentRecord};
use crate::domain::slug::generate_slug_today;
use crate::domain::types::ContentStatus;

const NAME_MAX: usize = 120;
const CATEGORY_MAX: usize = 60;

/// Payload of the product editor. A non-empty `id` selects update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductInput {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub price: i64,
    pub link: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct ProductService {
    reader: Arc<dyn ProductsRepo>,
    writer: Arc<dyn ProductsWriteRepo>,
    talents: Arc<dyn TalentsRepo>,
    trigger: CacheTrigger,
}

impl ProductService {
    pub fn new(
        reader: Arc<dyn ProductsRepo>,
        writer: Arc<dyn ProductsWriteRepo>,
        talents: Arc<dyn TalentsRepo>,
        trigger: CacheTrigger,
    ) -> Self {
        Self {
            reader,
            writer,
            talents,
            trigger,
        }
    }

    pub async fn product_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("product-by-id", id),
                vec![CacheTag::ProductById(id)],
                || async move { reader.find_product_by_id(id).await },
            )
            .await
    }

    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<ProductRecord>, RepoError> {
        let reader = self.reader.clone();
        let owned = slug.to_string();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("product-by-slug", slug),
                vec![CacheTag::ProductBySlug(slug.to_string())],
                || async move { reader.find_product_by_slug(&owned).await },
            )
            .await
    }

    /// Product by id as `viewer` may see it. Unpublished products are visible
    /// to the owning talent's user and admins only.
    pub async fn visible_product_by_id(
        &self,
        viewer: Option<&Actor>,
        id: Uuid,
    ) -> Result<Option<ProductRecord>, RepoError> {
        let Some(product) = self.product_by_id(id).await? else {
            return Ok(None);
        };
        if product.status.is_public() {
            return Ok(Some(product));
        }
        let Some(actor) = viewer else {
            return Ok(None);
        };
        if actor.is_admin() {
            return Ok(Some(product));
        }
        let owner = self.talents.find_talent_by_id(product.talent_id).await?;
        Ok(owner
            .filter(|talent| actor.can_edit(talent.user_id))
            .map(|_| product))
    }

    pub async fn public_product(&self, slug: &str) -> Result<Option<ProductRecord>, RepoError> {
        Ok(self
            .product_by_slug(slug)
            .await?
            .filter(|product| product.status.is_public()))
    }

    /// The public gallery: published products, newest first.
    pub async fn published_products(&self) -> Result<Vec<ProductRecord>, RepoError> {
        self.cached_list(
            CacheKey::new("products-published"),
            vec![CacheTag::Products],
            ProductFilter {
                status: Some(ContentStatus::Published),
                ..ProductFilter::default()
            },
        )
        .await
    }

    pub async fn all_products(&self) -> Result<Vec<ProductRecord>, RepoError> {
        self.cached_list(
            CacheKey::new("products"),
            vec![CacheTag::Products],
            ProductFilter::default(),
        )
        .await
    }

    pub async fn published_products_by_talent(
        &self,
        talent_id: Uuid,
    ) -> Result<Vec<ProductRecord>, RepoError> {
        self.cached_list(
            CacheKey::with("products-by-talent", talent_id),
            vec![CacheTag::TalentProducts(talent_id)],
            ProductFilter {
                status: Some(ContentStatus::Published),
                talent_id: Some(talent_id),
            },
        )
        .await
    }

    async fn cached_list(
        &self,
        key: CacheKey,
        tags: Vec<CacheTag>,
        filter: ProductFilter,
    ) -> Result<Vec<ProductRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(key, tags, || async move { reader.list_products(&filter).await })
            .await
    }

    /// Create or update a product of the actor's talent profile.
    pub async fn save_product(
        &self,
        actor: Option<&Actor>,
        input: ProductInput,
    ) -> Result<ProductRecord, ActionError> {
        let actor = require_actor(actor)?;
        let requested = parse_requested_status::<ContentStatus>(input.status.as_deref())?;
        let target = target_id(input.id.as_deref())?;
        let image = normalize_optional(input.image);
        let link = normalize_optional(input.link);

        Validator::new()
            .required("name", &input.name, NAME_MAX)
            .required("description", &input.description, usize::MAX)
            .required("category", &input.category, CATEGORY_MAX)
            .non_negative("price", input.price)
            .image("image", image.as_deref())
            .url("link", link.as_deref())
            .finish()?;

        let name = input.name.trim().to_string();
        let category = input.category.trim().to_string();

        let (product, talent) = match target {
            None => {
                let talent = self
                    .talents
                    .find_talent_by_user(actor.user_id)
                    .await?
                    .ok_or_else(|| {
                        ActionError::field("talent_id", "create a talent profile first")
                    })?;
                let status = permitted_status(actor, requested, ContentStatus::Draft)?;
                let slug = generate_slug_today(&name).map_err(|err| slug_issue(err, "name"))?;
                let product = self
                    .writer
                    .create_product(NewProduct {
                        slug,
                        name,
                        description: input.description,
                        image,
                        category,
                        price: input.price,
                        link,
                        status,
                        talent_id: talent.id,
                    })
                    .await?;
                (product, talent)
            }
            Some(id) => {
                let existing = self
                    .reader
                    .find_product_by_id(id)
                    .await?
                    .ok_or(ActionError::NotFound("product"))?;
                let talent = self.owning_talent(&existing).await?;
                if !actor.can_edit(talent.user_id) {
                    return Err(ActionError::Unauthorized);
                }
                let status = permitted_status(actor, requested, existing.status)?;
                let product = self
                    .writer
                    .update_product(ProductChanges {
                        id,
                        name,
                        description: input.description,
                        image,
                        category,
                        price: input.price,
                        link,
                        status,
                    })
                    .await?;
                (product, talent)
            }
        };

        self.trigger.publish(upserted(&product, &talent));
        Ok(product)
    }

    /// Moderation: set any status. Admin only.
    pub async fn set_product_status(
        &self,
        actor: Option<&Actor>,
        id: &str,
        status: &str,
    ) -> Result<ProductRecord, ActionError> {
        require_admin(actor)?;
        let status: ContentStatus = parse_status(status)?;
        let id = parse_id(id)?;

        let product = self.writer.update_product_status(id, status).await?;
        let talent = self.owning_talent(&product).await?;
        self.trigger.publish(upserted(&product, &talent));
        Ok(product)
    }

    pub async fn delete_product(
        &self,
        actor: Option<&Actor>,
        id: &str,
    ) -> Result<ProductRecord, ActionError> {
        let actor = require_actor(actor)?;
        let id = parse_id(id)?;
        let existing = self
            .reader
            .find_product_by_id(id)
            .await?
            .ok_or(ActionError::NotFound("product"))?;
        let talent = self.owning_talent(&existing).await?;
        if !actor.can_edit(talent.user_id) {
            return Err(ActionError::Unauthorized);
        }

        let product = self.writer.delete_product(id).await?;
        self.trigger.publish(CacheEvent::ProductDeleted {
            product_id: product.id,
            slug: product.slug.clone(),
            talent_id: talent.id,
            talent_slug: talent.slug.clone(),
        });
        Ok(product)
    }

    async fn owning_talent(&self, product: &ProductRecord) -> Result<TalentRecord, ActionError> {
        self.talents
            .find_talent_by_id(product.talent_id)
            .await?
            .ok_or(ActionError::NotFound("talent"))
    }
}

fn upserted(product: &ProductRecord, talent: &TalentRecord) -> CacheEvent {
    CacheEvent::ProductUpserted {
        product_id: product.id,
        slug: product.slug.clone(),
        talent_id: talent.id,
        talent_slug: talent.slug.clone(),
    }
}
