//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::{ContentStatus, HubStatus, ReviewStatus, UserRole};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: UserRole,
    pub bio: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserRecord {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TalentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slug: String,
    pub name: String,
    pub profession: String,
    pub industry: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub social_link: Option<String>,
    pub status: ReviewStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub status: ContentStatus,
    pub author_id: Uuid,
    pub community_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Length of [`ArticleCard::excerpt`] in characters.
pub const EXCERPT_CHARS: usize = 200;

/// First [`EXCERPT_CHARS`] characters of `content`.
pub fn excerpt(content: &str) -> String {
    content.chars().take(EXCERPT_CHARS).collect()
}

/// Community summary embedded in article listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityBadge {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub status: ReviewStatus,
}

/// Article listing row with its author and community eagerly loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleCard {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    /// Leading characters of the content.
    pub excerpt: String,
    pub thumbnail: Option<String>,
    pub status: ContentStatus,
    pub author_id: Uuid,
    pub author_name: String,
    pub community: Option<CommunityBadge>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub price: i64,
    pub link: Option<String>,
    pub status: ContentStatus,
    pub talent_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub location: Option<String>,
    pub category: String,
    pub status: ReviewStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubCategoryRecord {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubRecord {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub status: HubStatus,
    pub category_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Site-wide contact and branding settings. A single row at most.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppDataRecord {
    pub title: String,
    pub description: String,
    pub logo: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub instagram: String,
    pub whatsapp: String,
}

/// Talent detail page payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TalentProfile {
    pub talent: TalentRecord,
    pub products: Vec<ProductRecord>,
    pub articles: Vec<ArticleCard>,
}

/// Community detail page payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityProfile {
    pub community: CommunityRecord,
    pub articles: Vec<ArticleCard>,
}

/// Row counts reported by the health check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentCounts {
    pub articles: u64,
    pub users: u64,
    pub communities: u64,
    pub products: u64,
    pub hubs: u64,
}
