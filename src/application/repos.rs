//! Repository traits describing persistence adapters.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{
    AppDataRecord, ArticleCard, ArticleRecord, CommunityRecord, ContentCounts, HubCategoryRecord,
    HubRecord, ProductRecord, TalentRecord, UserRecord,
};
use crate::domain::types::{ContentStatus, HubStatus, ReviewStatus};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub status: Option<ContentStatus>,
    pub author_id: Option<Uuid>,
    pub community_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub status: ContentStatus,
    pub author_id: Uuid,
    pub community_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ArticleChanges {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub status: ContentStatus,
    pub community_id: Option<Uuid>,
}

#[async_trait]
pub trait ArticlesRepo: Send + Sync {
    async fn find_article_by_id(&self, id: Uuid) -> Result<Option<ArticleRecord>, RepoError>;

    async fn find_article_by_slug(&self, slug: &str) -> Result<Option<ArticleRecord>, RepoError>;

    /// Listing rows, newest first, with author and community loaded.
    async fn list_article_cards(&self, filter: &ArticleFilter)
    -> Result<Vec<ArticleCard>, RepoError>;
}

#[async_trait]
pub trait ArticlesWriteRepo: Send + Sync {
    async fn create_article(&self, params: NewArticle) -> Result<ArticleRecord, RepoError>;

    async fn update_article(&self, params: ArticleChanges) -> Result<ArticleRecord, RepoError>;

    async fn update_article_status(
        &self,
        id: Uuid,
        status: ContentStatus,
    ) -> Result<ArticleRecord, RepoError>;

    async fn delete_article(&self, id: Uuid) -> Result<ArticleRecord, RepoError>;
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub status: Option<ContentStatus>,
    pub talent_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub price: i64,
    pub link: Option<String>,
    pub status: ContentStatus,
    pub talent_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct ProductChanges {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub price: i64,
    pub link: Option<String>,
    pub status: ContentStatus,
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError>;

    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<ProductRecord>, RepoError>;

    /// Products newest first.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductRecord>, RepoError>;
}

#[async_trait]
pub trait ProductsWriteRepo: Send + Sync {
    async fn create_product(&self, params: NewProduct) -> Result<ProductRecord, RepoError>;

    async fn update_product(&self, params: ProductChanges) -> Result<ProductRecord, RepoError>;

    async fn update_product_status(
        &self,
        id: Uuid,
        status: ContentStatus,
    ) -> Result<ProductRecord, RepoError>;

    async fn delete_product(&self, id: Uuid) -> Result<ProductRecord, RepoError>;
}

// ---------------------------------------------------------------------------
// Talents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewTalent {
    pub user_id: Uuid,
    pub slug: String,
    pub name: String,
    pub profession: String,
    pub industry: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub social_link: Option<String>,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone)]
pub struct TalentChanges {
    pub id: Uuid,
    pub name: String,
    pub profession: String,
    pub industry: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub social_link: Option<String>,
}

#[async_trait]
pub trait TalentsRepo: Send + Sync {
    async fn find_talent_by_id(&self, id: Uuid) -> Result<Option<TalentRecord>, RepoError>;

    async fn find_talent_by_slug(&self, slug: &str) -> Result<Option<TalentRecord>, RepoError>;

    async fn find_talent_by_user(&self, user_id: Uuid) -> Result<Option<TalentRecord>, RepoError>;

    /// Talents ordered by name.
    async fn list_talents(
        &self,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<TalentRecord>, RepoError>;
}

#[async_trait]
pub trait TalentsWriteRepo: Send + Sync {
    async fn create_talent(&self, params: NewTalent) -> Result<TalentRecord, RepoError>;

    async fn update_talent(&self, params: TalentChanges) -> Result<TalentRecord, RepoError>;

    async fn update_talent_status(
        &self,
        id: Uuid,
        status: ReviewStatus,
    ) -> Result<TalentRecord, RepoError>;
}

// ---------------------------------------------------------------------------
// Communities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewCommunity {
    pub user_id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub location: Option<String>,
    pub category: String,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone)]
pub struct CommunityChanges {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub location: Option<String>,
    pub category: String,
}

#[async_trait]
pub trait CommunitiesRepo: Send + Sync {
    async fn find_community_by_id(&self, id: Uuid) -> Result<Option<CommunityRecord>, RepoError>;

    async fn find_community_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CommunityRecord>, RepoError>;

    async fn find_community_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CommunityRecord>, RepoError>;

    /// Communities ordered by name.
    async fn list_communities(
        &self,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<CommunityRecord>, RepoError>;
}

#[async_trait]
pub trait CommunitiesWriteRepo: Send + Sync {
    async fn create_community(&self, params: NewCommunity) -> Result<CommunityRecord, RepoError>;

    async fn update_community(
        &self,
        params: CommunityChanges,
    ) -> Result<CommunityRecord, RepoError>;

    async fn update_community_status(
        &self,
        id: Uuid,
        status: ReviewStatus,
    ) -> Result<CommunityRecord, RepoError>;
}

// ---------------------------------------------------------------------------
// Hubs and hub categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewHub {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub status: HubStatus,
    pub category_id: Uuid,
}

/// A removed category and the hubs removed with it.
#[derive(Debug, Clone)]
pub struct DeletedCategory {
    pub category: HubCategoryRecord,
    pub hubs: Vec<HubRecord>,
}

#[derive(Debug, Clone)]
pub struct HubChanges {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub status: HubStatus,
    pub category_id: Uuid,
}

#[async_trait]
pub trait HubsRepo: Send + Sync {
    async fn find_hub_by_id(&self, id: Uuid) -> Result<Option<HubRecord>, RepoError>;

    async fn find_hub_by_slug(&self, slug: &str) -> Result<Option<HubRecord>, RepoError>;

    /// Hubs ordered by name, optionally restricted to one category.
    async fn list_hubs(&self, category_id: Option<Uuid>) -> Result<Vec<HubRecord>, RepoError>;

    async fn find_category_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<HubCategoryRecord>, RepoError>;

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<HubCategoryRecord>, RepoError>;

    /// Categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<HubCategoryRecord>, RepoError>;
}

#[async_trait]
pub trait HubsWriteRepo: Send + Sync {
    async fn create_hub(&self, params: NewHub) -> Result<HubRecord, RepoError>;

    async fn update_hub(&self, params: HubChanges) -> Result<HubRecord, RepoError>;

    async fn update_hub_status(&self, id: Uuid, status: HubStatus)
    -> Result<HubRecord, RepoError>;

    async fn delete_hub(&self, id: Uuid) -> Result<HubRecord, RepoError>;

    async fn create_category(
        &self,
        slug: String,
        name: String,
    ) -> Result<HubCategoryRecord, RepoError>;

    async fn update_category(&self, id: Uuid, name: String)
    -> Result<HubCategoryRecord, RepoError>;

    /// Delete a category together with every hub in it, in one atomic step.
    async fn delete_category(&self, id: Uuid) -> Result<DeletedCategory, RepoError>;
}

// ---------------------------------------------------------------------------
// Users, app data, stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    /// Resolve an unexpired session token to its user.
    async fn find_user_by_session(&self, token: &str) -> Result<Option<UserRecord>, RepoError>;

    /// Users ordered by name.
    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError>;
}

#[async_trait]
pub trait UsersWriteRepo: Send + Sync {
    async fn update_profile(&self, params: ProfileChanges) -> Result<UserRecord, RepoError>;
}

#[async_trait]
pub trait AppDataRepo: Send + Sync {
    async fn load_app_data(&self) -> Result<Option<AppDataRecord>, RepoError>;

    async fn save_app_data(&self, record: AppDataRecord) -> Result<AppDataRecord, RepoError>;
}

#[async_trait]
pub trait StatsRepo: Send + Sync {
    async fn content_counts(&self) -> Result<ContentCounts, RepoError>;
}

/// Every repository trait implemented by one backend.
pub trait Backend:
    ArticlesRepo
    + ArticlesWriteRepo
    + ProductsRepo
    + ProductsWriteRepo
    + TalentsRepo
    + TalentsWriteRepo
    + CommunitiesRepo
    + CommunitiesWriteRepo
    + HubsRepo
    + HubsWriteRepo
    + UsersRepo
    + UsersWriteRepo
    + AppDataRepo
    + StatsRepo
    + 'static
{
}

impl<T> Backend for T where
    T: ArticlesRepo
        + ArticlesWriteRepo
        + ProductsRepo
        + ProductsWriteRepo
        + TalentsRepo
        + TalentsWriteRepo
        + CommunitiesRepo
        + CommunitiesWriteRepo
        + HubsRepo
        + HubsWriteRepo
        + UsersRepo
        + UsersWriteRepo
        + AppDataRepo
        + StatsRepo
        + 'static
{
}

/// Trait objects for each repository, shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub articles: Arc<dyn ArticlesRepo>,
    pub articles_write: Arc<dyn ArticlesWriteRepo>,
    pub products: Arc<dyn ProductsRepo>,
    pub products_write: Arc<dyn ProductsWriteRepo>,
    pub talents: Arc<dyn TalentsRepo>,
    pub talents_write: Arc<dyn TalentsWriteRepo>,
    pub communities: Arc<dyn CommunitiesRepo>,
    pub communities_write: Arc<dyn CommunitiesWriteRepo>,
    pub hubs: Arc<dyn HubsRepo>,
    pub hubs_write: Arc<dyn HubsWriteRepo>,
    pub users: Arc<dyn UsersRepo>,
    pub users_write: Arc<dyn UsersWriteRepo>,
    pub app_data: Arc<dyn AppDataRepo>,
    pub stats: Arc<dyn StatsRepo>,
}

impl Repositories {
    pub fn from_backend<B: Backend>(backend: Arc<B>) -> Self {
        Self {
            articles: backend.clone(),
            articles_write: backend.clone(),
            products: backend.clone(),
            products_write: backend.clone(),
            talents: backend.clone(),
            talents_write: backend.clone(),
            communities: backend.clone(),
            communities_write: backend.clone(),
            hubs: backend.clone(),
            hubs_write: backend.clone(),
            users: backend.clone(),
            users_write: backend.clone(),
            app_data: backend.clone(),
            stats: backend,
        }
    }
}
