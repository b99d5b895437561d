//! Cache events published by write paths after a successful commit.

use uuid::Uuid;

/// A committed change that may have made cached reads stale.
///
/// Each variant carries the identifiers needed to address every dependent tag,
/// including tags of related records (owning talent, author, parent category).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    ArticleUpserted {
        article_id: Uuid,
        slug: String,
        author_id: Uuid,
        community_id: Option<Uuid>,
        previous_community_id: Option<Uuid>,
    },
    ArticleDeleted {
        article_id: Uuid,
        slug: String,
        author_id: Uuid,
        community_id: Option<Uuid>,
    },
    ProductUpserted {
        product_id: Uuid,
        slug: String,
        talent_id: Uuid,
        talent_slug: String,
    },
    ProductDeleted {
        product_id: Uuid,
        slug: String,
        talent_id: Uuid,
        talent_slug: String,
    },
    TalentUpserted {
        talent_id: Uuid,
        slug: String,
        user_id: Uuid,
    },
    CommunityUpserted {
        community_id: Uuid,
        slug: String,
        user_id: Uuid,
    },
    HubUpserted {
        hub_id: Uuid,
        slug: String,
        category_id: Uuid,
        previous_category_id: Option<Uuid>,
    },
    HubDeleted {
        hub_id: Uuid,
        slug: String,
        category_id: Uuid,
    },
    HubCategoryUpserted {
        category_id: Uuid,
        slug: String,
    },
    /// Deleting a category cascades to its hubs; `hubs` lists (id, slug) of each child.
    HubCategoryDeleted {
        category_id: Uuid,
        slug: String,
        hubs: Vec<(Uuid, String)>,
    },
    UserUpdated {
        user_id: Uuid,
    },
    AppDataUpdated,
}

impl CacheEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            CacheEvent::ArticleUpserted { .. } => "article.upserted",
            CacheEvent::ArticleDeleted { .. } => "article.deleted",
            CacheEvent::ProductUpserted { .. } => "product.upserted",
            CacheEvent::ProductDeleted { .. } => "product.deleted",
            CacheEvent::TalentUpserted { .. } => "talent.upserted",
            CacheEvent::CommunityUpserted { .. } => "community.upserted",
            CacheEvent::HubUpserted { .. } => "hub.upserted",
            CacheEvent::HubDeleted { .. } => "hub.deleted",
            CacheEvent::HubCategoryUpserted { .. } => "hub_category.upserted",
            CacheEvent::HubCategoryDeleted { .. } => "hub_category.deleted",
            CacheEvent::UserUpdated { .. } => "user.updated",
            CacheEvent::AppDataUpdated => "app_data.updated",
        }
    }
}
