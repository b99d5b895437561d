//! Cache key and tag definitions.
//!
//! A [`CacheKey`] addresses one memoized computation. A [`CacheTag`] labels a
//! family of keys so they can be dropped together when the data behind them
//! changes.

use std::fmt;

use uuid::Uuid;

/// Version segment of every key. Bump when cached value shapes change.
pub const CACHE_VERSION: &str = "v1";

/// Identifies one cached computation: (resource, version, discriminator).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    resource: &'static str,
    version: &'static str,
    discriminator: Option<String>,
}

impl CacheKey {
    /// Key for a resource whose result does not vary by argument.
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            version: CACHE_VERSION,
            discriminator: None,
        }
    }

    /// Key for a resource parameterised by an id, slug or similar.
    pub fn with(resource: &'static str, discriminator: impl fmt::Display) -> Self {
        Self {
            resource,
            version: CACHE_VERSION,
            discriminator: Some(discriminator.to_string()),
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.discriminator {
            Some(value) => write!(f, "{}:{}:{}", self.resource, self.version, value),
            None => write!(f, "{}:{}", self.resource, self.version),
        }
    }
}

/// Invalidation label attached to cache keys at store time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheTag {
    // Articles
    Articles,
    PublishedArticles,
    ArticleById(Uuid),
    ArticleBySlug(String),
    /// Articles written by a user.
    UserArticles(Uuid),
    /// Articles attached to a community.
    CommunityArticles(Uuid),

    // Products
    Products,
    ProductById(Uuid),
    ProductBySlug(String),
    /// Products owned by a talent.
    TalentProducts(Uuid),

    // Talents
    Talents,
    TalentById(Uuid),
    TalentBySlug(String),
    /// The talent profile owned by a user.
    UserTalent(Uuid),

    // Communities
    Communities,
    CommunityById(Uuid),
    CommunityBySlug(String),
    /// The community owned by a user.
    UserCommunity(Uuid),

    // Hubs
    Hubs,
    HubById(Uuid),
    HubBySlug(String),
    HubCategories,
    HubCategoryById(Uuid),
    HubCategoryBySlug(String),

    // Users
    Users,
    UserById(Uuid),

    AppData,
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTag::Articles => f.write_str("articles"),
            CacheTag::PublishedArticles => f.write_str("articles:published"),
            CacheTag::ArticleById(id) => write!(f, "article:id:{id}"),
            CacheTag::ArticleBySlug(slug) => write!(f, "article:slug:{slug}"),
            CacheTag::UserArticles(id) => write!(f, "user:{id}:articles"),
            CacheTag::CommunityArticles(id) => write!(f, "community:{id}:articles"),
            CacheTag::Products => f.write_str("products"),
            CacheTag::ProductById(id) => write!(f, "product:id:{id}"),
            CacheTag::ProductBySlug(slug) => write!(f, "product:slug:{slug}"),
            CacheTag::TalentProducts(id) => write!(f, "talent:{id}:products"),
            CacheTag::Talents => f.write_str("talents"),
            CacheTag::TalentById(id) => write!(f, "talent:id:{id}"),
            CacheTag::TalentBySlug(slug) => write!(f, "talent:slug:{slug}"),
            CacheTag::UserTalent(id) => write!(f, "user:{id}:talent"),
            CacheTag::Communities => f.write_str("communities"),
            CacheTag::CommunityById(id) => write!(f, "community:id:{id}"),
            CacheTag::CommunityBySlug(slug) => write!(f, "community:slug:{slug}"),
            CacheTag::UserCommunity(id) => write!(f, "user:{id}:community"),
            CacheTag::Hubs => f.write_str("hubs"),
            CacheTag::HubById(id) => write!(f, "hub:id:{id}"),
            CacheTag::HubBySlug(slug) => write!(f, "hub:slug:{slug}"),
            CacheTag::HubCategories => f.write_str("hub-categories"),
            CacheTag::HubCategoryById(id) => write!(f, "hub-category:id:{id}"),
            CacheTag::HubCategoryBySlug(slug) => write!(f, "hub-category:slug:{slug}"),
            CacheTag::Users => f.write_str("users"),
            CacheTag::UserById(id) => write!(f, "user:id:{id}"),
            CacheTag::AppData => f.write_str("app-data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminator_separates_keys() {
        let a = CacheKey::with("product-by-slug", "kopi");
        let b = CacheKey::with("product-by-slug", "teh");
        assert_ne!(a, b);
        assert_eq!(a, CacheKey::with("product-by-slug", "kopi"));
        assert_ne!(CacheKey::new("products"), CacheKey::with("products", ""));
    }

    #[test]
    fn keys_render_with_version() {
        assert_eq!(CacheKey::new("app-data").to_string(), "app-data:v1");
        assert_eq!(
            CacheKey::with("hub-by-slug", "inkubator").to_string(),
            "hub-by-slug:v1:inkubator"
        );
    }

    #[test]
    fn tags_render_as_labels() {
        let id = Uuid::nil();
        assert_eq!(CacheTag::Products.to_string(), "products");
        assert_eq!(
            CacheTag::TalentProducts(id).to_string(),
            format!("talent:{id}:products")
        );
        assert_eq!(
            CacheTag::ProductBySlug("kopi".into()).to_string(),
            "product:slug:kopi"
        );
    }
}
