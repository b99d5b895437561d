use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::application::actions::{
    ActionError, Actor, Validator, normalize_optional, require_actor,
};
use crate::application::repos::{ProfileChanges, RepoError, UsersRepo, UsersWriteRepo};
use crate::cache::{CacheEvent, CacheKey, CacheTag, CacheTrigger};
use crate::domain::entities::UserRecord;

const NAME_MAX: usize = 120;
const BIO_MAX: usize = 1000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    reader: Arc<dyn UsersRepo>,
    writer: Arc<dyn UsersWriteRepo>,
    trigger: CacheTrigger,
}

impl UserService {
    pub fn new(
        reader: Arc<dyn UsersRepo>,
        writer: Arc<dyn UsersWriteRepo>,
        trigger: CacheTrigger,
    ) -> Self {
        Self {
            reader,
            writer,
            trigger,
        }
    }

    /// Resolve a bearer session token. Sessions are never cached.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<UserRecord>, RepoError> {
        if token.is_empty() {
            return Ok(None);
        }
        self.reader.find_user_by_session(token).await
    }

    pub async fn user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(
                CacheKey::with("user-by-id", id),
                vec![CacheTag::UserById(id)],
                || async move { reader.find_user_by_id(id).await },
            )
            .await
    }

    pub async fn all_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        let reader = self.reader.clone();
        self.trigger
            .cache()
            .fetch(CacheKey::new("users"), vec![CacheTag::Users], || async move {
                reader.list_users().await
            })
            .await
    }

    /// Update the actor's own profile.
    pub async fn update_profile(
        &self,
        actor: Option<&Actor>,
        input: ProfileInput,
    ) -> Result<UserRecord, ActionError> {
        let actor = require_actor(actor)?;
        let image = normalize_optional(input.image);
        let bio = normalize_optional(input.bio);

        Validator::new()
            .required("name", &input.name, NAME_MAX)
            .image("image", image.as_deref())
            .max_len("bio", bio.as_deref(), BIO_MAX)
            .finish()?;

        let user = self
            .writer
            .update_profile(ProfileChanges {
                id: actor.user_id,
                name: input.name.trim().to_string(),
                image,
                bio,
            })
            .await?;

        self.trigger
            .publish(CacheEvent::UserUpdated { user_id: user.id });
        Ok(user)
    }
}
