use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::application::actions::{
    ActionError, Actor, Validator, normalize_optional, parse_id, parse_status, require_actor,
    require_admin, slug_issue, target_id,
};
use crate::application::repos::{
    CommunitiesRepo, CommunitiesWriteRepo, CommunityChanges, NewCommunity, RepoError,
};
use crate::cache::{CacheEvent, CacheKey, CacheTag, CacheTrigger};
use crate::domain::entities::CommunityRecord;
use crate::domain::slug::generate_slug_today;
use crate::domain::types::ReviewStatus;

const NAME_MAX: usize = 120;
const LABEL_MAX: usize = 80;

/// Payload of the community form. A non-empty `id` selects update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommunityInput {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub location: Option<String>,
    pub category: String,
}

#[derive(Clone)]
pub struct CommunityService {
    reader: Arc<dyn CommunitiesRepo>,
    writer: Arc<dyn CommunitiesWriteRepo>,
    trigger: CacheTrigger,
}

impl CommunityService {
    pub fn new(
        reader: Arc<dyn CommunitiesRepo>,
        writer: Arc<dyn CommunitiesWriteRepo>,
        trigger: CacheTrigger,
    ) -> Self {
        Self {
            reader,
            writer,
            trigger,
        }
    }

    pub async fn community_by_id(&self, id: Uuid) -> Result<Option<CommunityRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("community-by-id", id),
                vec![CacheTag::CommunityById(id)],
                || async move { reader.find_community_by_id(id).await },
            )
            .await
    }

    pub async fn community_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CommunityRecord>, RepoError> {
        let reader = self.reader.clone();
        let owned = slug.to_string();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("community-by-slug", slug),
                vec![CacheTag::CommunityBySlug(slug.to_string())],
                || async move { reader.find_community_by_slug(&owned).await },
            )
            .await
    }

    pub async fn community_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CommunityRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("community-by-user", user_id),
                vec![CacheTag::UserCommunity(user_id)],
                || async move { reader.find_community_by_user(user_id).await },
            )
            .await
    }

    pub async fn approved_communities(&self) -> Result<Vec<CommunityRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::new("communities-approved"),
                vec![CacheTag::Communities],
                || async move { reader.list_communities(Some(ReviewStatus::Approved)).await },
            )
            .await
    }

    pub async fn all_communities(&self) -> Result<Vec<CommunityRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::new("communities"),
                vec![CacheTag::Communities],
                || async move { reader.list_communities(None).await },
            )
            .await
    }

    /// Create the actor's community or update an existing one.
    ///
    /// New communities start `pending` and wait for review.
    pub async fn save_community(
        &self,
        actor: Option<&Actor>,
        input: CommunityInput,
    ) -> Result<CommunityRecord, ActionError> {
        let actor = require_actor(actor)?;
        let target = target_id(input.id.as_deref())?;
        let image = normalize_optional(input.image);
        let location = normalize_optional(input.location);

        Validator::new()
            .required("name", &input.name, NAME_MAX)
            .required("description", &input.description, usize::MAX)
            .required("category", &input.category, LABEL_MAX)
            .image("image", image.as_deref())
            .max_len("location", location.as_deref(), NAME_MAX)
            .finish()?;

        let name = input.name.trim().to_string();
        let category = input.category.trim().to_string();

        let community = match target {
            None => {
                let slug = generate_slug_today(&name).map_err(|err| slug_issue(err, "name"))?;
                self.writer
                    .create_community(NewCommunity {
                        user_id: actor.user_id,
                        slug,
                        name,
                        description: input.description,
                        image,
                        location,
                        category,
                        status: ReviewStatus::Pending,
                    })
                    .await?
            }
            Some(id) => {
                let existing = self
                    .reader
                    .find_community_by_id(id)
                    .await?
                    .ok_or(ActionError::NotFound("community"))?;
                if !actor.can_edit(existing.user_id) {
                    return Err(ActionError::Unauthorized);
                }
                self.writer
                    .update_community(CommunityChanges {
                        id,
                        name,
                        description: input.description,
                        image,
                        location,
                        category,
                    })
                    .await?
            }
        };

        self.trigger.publish(upserted(&community));
        Ok(community)
    }

    /// Review decision on a community. Admin only.
    pub async fn set_community_status(
        &self,
        actor: Option<&Actor>,
        id: &str,
        status: &str,
    ) -> Result<CommunityRecord, ActionError> {
        require_admin(actor)?;
        let status: ReviewStatus = parse_status(status)?;
        let id = parse_id(id)?;

        let community = self.writer.update_community_status(id, status).await?;
        self.trigger.publish(upserted(&community));
        Ok(community)
    }
}

fn upserted(community: &CommunityRecord) -> CacheEvent {
    CacheEvent::CommunityUpserted {
        community_id: community.id,
        slug: community.slug.clone(),
        user_id: community.user_id,
    }
}
