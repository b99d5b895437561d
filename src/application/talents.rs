use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::application::actions::{
    ActionError, Actor, Validator, normalize_optional, parse_id, parse_status, require_actor,
    require_admin, slug_issue, target_id,
};
use crate::application::repos::{
    NewTalent, RepoError, TalentChanges, TalentsRepo, TalentsWriteRepo,
};
use crate::cache::{CacheEvent, CacheKey, CacheTag, CacheTrigger};
use crate::domain::entities::TalentRecord;
use crate::domain::slug::generate_slug_today;
use crate::domain::types::ReviewStatus;

const NAME_MAX: usize = 120;
const LABEL_MAX: usize = 80;

/// Payload of the talent profile form. A non-empty `id` selects update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TalentInput {
    pub id: Option<String>,
    pub name: String,
    pub profession: String,
    pub industry: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub social_link: Option<String>,
}

#[derive(Clone)]
pub struct TalentService {
    reader: Arc<dyn TalentsRepo>,
    writer: Arc<dyn TalentsWriteRepo>,
    trigger: CacheTrigger,
}

impl TalentService {
    pub fn new(
        reader: Arc<dyn TalentsRepo>,
        writer: Arc<dyn TalentsWriteRepo>,
        trigger: CacheTrigger,
    ) -> Self {
        Self {
            reader,
            writer,
            trigger,
        }
    }

    pub async fn talent_by_id(&self, id: Uuid) -> Result<Option<TalentRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("talent-by-id", id),
                vec![CacheTag::TalentById(id)],
                || async move { reader.find_talent_by_id(id).await },
            )
            .await
    }

    pub async fn talent_by_slug(&self, slug: &str) -> Result<Option<TalentRecord>, RepoError> {
        let reader = self.reader.clone();
        let owned = slug.to_string();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("talent-by-slug", slug),
                vec![CacheTag::TalentBySlug(slug.to_string())],
                || async move { reader.find_talent_by_slug(&owned).await },
            )
            .await
    }

    pub async fn talent_by_user(&self, user_id: Uuid) -> Result<Option<TalentRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("talent-by-user", user_id),
                vec![CacheTag::UserTalent(user_id)],
                || async move { reader.find_talent_by_user(user_id).await },
            )
            .await
    }

    pub async fn approved_talents(&self) -> Result<Vec<TalentRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::new("talents-approved"),
                vec![CacheTag::Talents],
                || async move { reader.list_talents(Some(ReviewStatus::Approved)).await },
            )
            .await
    }

    pub async fn all_talents(&self) -> Result<Vec<TalentRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::new("talents"),
                vec![CacheTag::Talents],
                || async move { reader.list_talents(None).await },
            )
            .await
    }

    /// Create the actor's talent profile or update an existing one.
    ///
    /// New profiles start `pending` and wait for review.
    pub async fn save_talent(
        &self,
        actor: Option<&Actor>,
        input: TalentInput,
    ) -> Result<TalentRecord, ActionError> {
        let actor = require_actor(actor)?;
        let target = target_id(input.id.as_deref())?;
        let description = normalize_optional(input.description);
        let image = normalize_optional(input.image);
        let social_link = normalize_optional(input.social_link);

        Validator::new()
            .required("name", &input.name, NAME_MAX)
            .required("profession", &input.profession, LABEL_MAX)
            .required("industry", &input.industry, LABEL_MAX)
            .image("image", image.as_deref())
            .url("social_link", social_link.as_deref())
            .finish()?;

        let name = input.name.trim().to_string();
        let profession = input.profession.trim().to_string();
        let industry = input.industry.trim().to_string();

        let talent = match target {
            None => {
                let slug = generate_slug_today(&name).map_err(|err| slug_issue(err, "name"))?;
                self.writer
                    .create_talent(NewTalent {
                        user_id: actor.user_id,
                        slug,
                        name,
                        profession,
                        industry,
                        description,
                        image,
                        social_link,
                        status: ReviewStatus::Pending,
                    })
                    .await?
            }
            Some(id) => {
                let existing = self
                    .reader
                    .find_talent_by_id(id)
                    .await?
                    .ok_or(ActionError::NotFound("talent"))?;
                if !actor.can_edit(existing.user_id) {
                    return Err(ActionError::Unauthorized);
                }
                self.writer
                    .update_talent(TalentChanges {
                        id,
                        name,
                        profession,
                        industry,
                        description,
                        image,
                        social_link,
                    })
                    .await?
            }
        };

        self.trigger.publish(upserted(&talent));
        Ok(talent)
    }

    /// Review decision on a talent profile. Admin only.
    pub async fn set_talent_status(
        &self,
        actor: Option<&Actor>,
        id: &str,
        status: &str,
    ) -> Result<TalentRecord, ActionError> {
        require_admin(actor)?;
        let status: ReviewStatus = parse_status(status)?;
        let id = parse_id(id)?;

        let talent = self.writer.update_talent_status(id, status).await?;
        self.trigger.publish(upserted(&talent));
        Ok(talent)
    }
}

fn upserted(talent: &TalentRecord) -> CacheEvent {
    CacheEvent::TalentUpserted {
        talent_id: talent.id,
        slug: talent.slug.clone(),
        user_id: talent.user_id,
    }
}
