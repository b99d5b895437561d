//! In-process storage backend.
//!
//! Selected with `database.url = "memory://"`. Enforces the same unique slugs,
//! one-talent-per-user and cascading category deletes as the Postgres schema,
//! and counts reads and writes so callers can observe cache behaviour.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::repos::{
    AppDataRepo, ArticleChanges, ArticleFilter, ArticlesRepo, ArticlesWriteRepo, CommunitiesRepo,
    CommunitiesWriteRepo, CommunityChanges, DeletedCategory, HubChanges, HubsRepo, HubsWriteRepo,
    NewArticle, NewCommunity, NewHub, NewProduct, NewTalent, ProductChanges, ProductFilter,
    ProductsRepo, ProductsWriteRepo, ProfileChanges, RepoError, StatsRepo, TalentChanges,
    TalentsRepo, TalentsWriteRepo, UsersRepo, UsersWriteRepo,
};
use crate::domain::entities::{
    AppDataRecord, ArticleCard, ArticleRecord, CommunityBadge, CommunityRecord, ContentCounts,
    HubCategoryRecord, HubRecord, ProductRecord, TalentRecord, UserRecord, excerpt,
};
use crate::domain::types::{ContentStatus, HubStatus, ReviewStatus};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, UserRecord>,
    sessions: HashMap<String, (Uuid, OffsetDateTime)>,
    talents: HashMap<Uuid, TalentRecord>,
    communities: HashMap<Uuid, CommunityRecord>,
    articles: HashMap<Uuid, ArticleRecord>,
    products: HashMap<Uuid, ProductRecord>,
    categories: HashMap<Uuid, HubCategoryRecord>,
    hubs: HashMap<Uuid, HubRecord>,
    app_data: Option<AppDataRecord>,
}

#[derive(Default)]
pub struct InMemoryRepositories {
    state: RwLock<State>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

fn duplicate(constraint: &str) -> RepoError {
    RepoError::Duplicate {
        constraint: constraint.to_string(),
    }
}

fn foreign_key(message: &str) -> RepoError {
    RepoError::InvalidInput {
        message: message.to_string(),
    }
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of read queries served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write statements executed so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn insert_user(&self, user: UserRecord) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Register a session token for `user_id`, valid until `expires_at`.
    pub async fn insert_session(
        &self,
        token: impl Into<String>,
        user_id: Uuid,
        expires_at: OffsetDateTime,
    ) {
        self.state
            .write()
            .await
            .sessions
            .insert(token.into(), (user_id, expires_at));
    }
}

fn card(state: &State, article: &ArticleRecord) -> ArticleCard {
    let author_name = state
        .users
        .get(&article.author_id)
        .map(|user| user.name.clone())
        .unwrap_or_default();
    let community = article
        .community_id
        .and_then(|id| state.communities.get(&id))
        .map(|community| CommunityBadge {
            id: community.id,
            slug: community.slug.clone(),
            name: community.name.clone(),
            status: community.status,
        });
    ArticleCard {
        id: article.id,
        slug: article.slug.clone(),
        title: article.title.clone(),
        excerpt: excerpt(&article.content),
        thumbnail: article.thumbnail.clone(),
        status: article.status,
        author_id: article.author_id,
        author_name,
        community,
        created_at: article.created_at,
    }
}

fn by_name<T>(mut items: Vec<T>, name: impl Fn(&T) -> String) -> Vec<T> {
    items.sort_by_key(|item| name(item).to_lowercase());
    items
}

#[async_trait]
impl ArticlesRepo for InMemoryRepositories {
    async fn find_article_by_id(&self, id: Uuid) -> Result<Option<ArticleRecord>, RepoError> {
        self.read();
        Ok(self.state.read().await.articles.get(&id).cloned())
    }

    async fn find_article_by_slug(&self, slug: &str) -> Result<Option<ArticleRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        Ok(state
            .articles
            .values()
            .find(|article| article.slug == slug)
            .cloned())
    }

    async fn list_article_cards(
        &self,
        filter: &ArticleFilter,
    ) -> Result<Vec<ArticleCard>, RepoError> {
        self.read();
        let state = self.state.read().await;
        let mut articles: Vec<&ArticleRecord> = state
            .articles
            .values()
            .filter(|article| filter.status.is_none_or(|status| article.status == status))
            .filter(|article| filter.author_id.is_none_or(|id| article.author_id == id))
            .filter(|article| {
                filter
                    .community_id
                    .is_none_or(|id| article.community_id == Some(id))
            })
            .collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(articles.into_iter().map(|article| card(&state, article)).collect())
    }
}

#[async_trait]
impl ArticlesWriteRepo for InMemoryRepositories {
    async fn create_article(&self, params: NewArticle) -> Result<ArticleRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        if state.articles.values().any(|a| a.slug == params.slug) {
            return Err(duplicate("articles_slug_key"));
        }
        if !state.users.contains_key(&params.author_id) {
            return Err(foreign_key("article author does not exist"));
        }
        if let Some(community_id) = params.community_id {
            if !state.communities.contains_key(&community_id) {
                return Err(foreign_key("article community does not exist"));
            }
        }
        let now = OffsetDateTime::now_utc();
        let article = ArticleRecord {
            id: Uuid::new_v4(),
            slug: params.slug,
            title: params.title,
            content: params.content,
            thumbnail: params.thumbnail,
            status: params.status,
            author_id: params.author_id,
            community_id: params.community_id,
            created_at: now,
            updated_at: now,
        };
        state.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn update_article(&self, params: ArticleChanges) -> Result<ArticleRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        if let Some(community_id) = params.community_id {
            if !state.communities.contains_key(&community_id) {
                return Err(foreign_key("article community does not exist"));
            }
        }
        let article = state
            .articles
            .get_mut(&params.id)
            .ok_or(RepoError::NotFound)?;
        article.title = params.title;
        article.content = params.content;
        article.thumbnail = params.thumbnail;
        article.status = params.status;
        article.community_id = params.community_id;
        article.updated_at = OffsetDateTime::now_utc();
        Ok(article.clone())
    }

    async fn update_article_status(
        &self,
        id: Uuid,
        status: ContentStatus,
    ) -> Result<ArticleRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        let article = state.articles.get_mut(&id).ok_or(RepoError::NotFound)?;
        article.status = status;
        article.updated_at = OffsetDateTime::now_utc();
        Ok(article.clone())
    }

    async fn delete_article(&self, id: Uuid) -> Result<ArticleRecord, RepoError> {
        self.wrote();
        self.state
            .write()
            .await
            .articles
            .remove(&id)
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ProductsRepo for InMemoryRepositories {
    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        self.read();
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<ProductRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .find(|product| product.slug == slug)
            .cloned())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        let mut products: Vec<ProductRecord> = state
            .products
            .values()
            .filter(|product| filter.status.is_none_or(|status| product.status == status))
            .filter(|product| filter.talent_id.is_none_or(|id| product.talent_id == id))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(products)
    }
}

#[async_trait]
impl ProductsWriteRepo for InMemoryRepositories {
    async fn create_product(&self, params: NewProduct) -> Result<ProductRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        if state.products.values().any(|p| p.slug == params.slug) {
            return Err(duplicate("products_slug_key"));
        }
        if !state.talents.contains_key(&params.talent_id) {
            return Err(foreign_key("product talent does not exist"));
        }
        let now = OffsetDateTime::now_utc();
        let product = ProductRecord {
            id: Uuid::new_v4(),
            slug: params.slug,
            name: params.name,
            description: params.description,
            image: params.image,
            category: params.category,
            price: params.price,
            link: params.link,
            status: params.status,
            talent_id: params.talent_id,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, params: ProductChanges) -> Result<ProductRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(&params.id)
            .ok_or(RepoError::NotFound)?;
        product.name = params.name;
        product.description = params.description;
        product.image = params.image;
        product.category = params.category;
        product.price = params.price;
        product.link = params.link;
        product.status = params.status;
        product.updated_at = OffsetDateTime::now_utc();
        Ok(product.clone())
    }

    async fn update_product_status(
        &self,
        id: Uuid,
        status: ContentStatus,
    ) -> Result<ProductRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        let product = state.products.get_mut(&id).ok_or(RepoError::NotFound)?;
        product.status = status;
        product.updated_at = OffsetDateTime::now_utc();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<ProductRecord, RepoError> {
        self.wrote();
        self.state
            .write()
            .await
            .products
            .remove(&id)
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl TalentsRepo for InMemoryRepositories {
    async fn find_talent_by_id(&self, id: Uuid) -> Result<Option<TalentRecord>, RepoError> {
        self.read();
        Ok(self.state.read().await.talents.get(&id).cloned())
    }

    async fn find_talent_by_slug(&self, slug: &str) -> Result<Option<TalentRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        Ok(state.talents.values().find(|t| t.slug == slug).cloned())
    }

    async fn find_talent_by_user(&self, user_id: Uuid) -> Result<Option<TalentRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        Ok(state.talents.values().find(|t| t.user_id == user_id).cloned())
    }

    async fn list_talents(
        &self,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<TalentRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        let talents = state
            .talents
            .values()
            .filter(|talent| status.is_none_or(|status| talent.status == status))
            .cloned()
            .collect();
        Ok(by_name(talents, |talent: &TalentRecord| talent.name.clone()))
    }
}

#[async_trait]
impl TalentsWriteRepo for InMemoryRepositories {
    async fn create_talent(&self, params: NewTalent) -> Result<TalentRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        if state.talents.values().any(|t| t.slug == params.slug) {
            return Err(duplicate("talents_slug_key"));
        }
        if state.talents.values().any(|t| t.user_id == params.user_id) {
            return Err(duplicate("talents_user_id_key"));
        }
        let now = OffsetDateTime::now_utc();
        let talent = TalentRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            slug: params.slug,
            name: params.name,
            profession: params.profession,
            industry: params.industry,
            description: params.description,
            image: params.image,
            social_link: params.social_link,
            status: params.status,
            created_at: now,
            updated_at: now,
        };
        state.talents.insert(talent.id, talent.clone());
        Ok(talent)
    }

    async fn update_talent(&self, params: TalentChanges) -> Result<TalentRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        let talent = state
            .talents
            .get_mut(&params.id)
            .ok_or(RepoError::NotFound)?;
        talent.name = params.name;
        talent.profession = params.profession;
        talent.industry = params.industry;
        talent.description = params.description;
        talent.image = params.image;
        talent.social_link = params.social_link;
        talent.updated_at = OffsetDateTime::now_utc();
        Ok(talent.clone())
    }

    async fn update_talent_status(
        &self,
        id: Uuid,
        status: ReviewStatus,
    ) -> Result<TalentRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        let talent = state.talents.get_mut(&id).ok_or(RepoError::NotFound)?;
        talent.status = status;
        talent.updated_at = OffsetDateTime::now_utc();
        Ok(talent.clone())
    }
}

#[async_trait]
impl CommunitiesRepo for InMemoryRepositories {
    async fn find_community_by_id(&self, id: Uuid) -> Result<Option<CommunityRecord>, RepoError> {
        self.read();
        Ok(self.state.read().await.communities.get(&id).cloned())
    }

    async fn find_community_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CommunityRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        Ok(state.communities.values().find(|c| c.slug == slug).cloned())
    }

    async fn find_community_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CommunityRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        Ok(state
            .communities
            .values()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn list_communities(
        &self,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<CommunityRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        let communities = state
            .communities
            .values()
            .filter(|community| status.is_none_or(|status| community.status == status))
            .cloned()
            .collect();
        Ok(by_name(communities, |community: &CommunityRecord| {
            community.name.clone()
        }))
    }
}

#[async_trait]
impl CommunitiesWriteRepo for InMemoryRepositories {
    async fn create_community(&self, params: NewCommunity) -> Result<CommunityRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        if state.communities.values().any(|c| c.slug == params.slug) {
            return Err(duplicate("communities_slug_key"));
        }
        if state.communities.values().any(|c| c.user_id == params.user_id) {
            return Err(duplicate("communities_user_id_key"));
        }
        let now = OffsetDateTime::now_utc();
        let community = CommunityRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            slug: params.slug,
            name: params.name,
            description: params.description,
            image: params.image,
            location: params.location,
            category: params.category,
            status: params.status,
            created_at: now,
            updated_at: now,
        };
        state.communities.insert(community.id, community.clone());
        Ok(community)
    }

    async fn update_community(
        &self,
        params: CommunityChanges,
    ) -> Result<CommunityRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        let community = state
            .communities
            .get_mut(&params.id)
            .ok_or(RepoError::NotFound)?;
        community.name = params.name;
        community.description = params.description;
        community.image = params.image;
        community.location = params.location;
        community.category = params.category;
        community.updated_at = OffsetDateTime::now_utc();
        Ok(community.clone())
    }

    async fn update_community_status(
        &self,
        id: Uuid,
        status: ReviewStatus,
    ) -> Result<CommunityRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        let community = state.communities.get_mut(&id).ok_or(RepoError::NotFound)?;
        community.status = status;
        community.updated_at = OffsetDateTime::now_utc();
        Ok(community.clone())
    }
}

#[async_trait]
impl HubsRepo for InMemoryRepositories {
    async fn find_hub_by_id(&self, id: Uuid) -> Result<Option<HubRecord>, RepoError> {
        self.read();
        Ok(self.state.read().await.hubs.get(&id).cloned())
    }

    async fn find_hub_by_slug(&self, slug: &str) -> Result<Option<HubRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        Ok(state.hubs.values().find(|hub| hub.slug == slug).cloned())
    }

    async fn list_hubs(&self, category_id: Option<Uuid>) -> Result<Vec<HubRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        let hubs = state
            .hubs
            .values()
            .filter(|hub| category_id.is_none_or(|id| hub.category_id == id))
            .cloned()
            .collect();
        Ok(by_name(hubs, |hub: &HubRecord| hub.name.clone()))
    }

    async fn find_category_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<HubCategoryRecord>, RepoError> {
        self.read();
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<HubCategoryRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        Ok(state.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<HubCategoryRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        let categories = state.categories.values().cloned().collect();
        Ok(by_name(categories, |category: &HubCategoryRecord| {
            category.name.clone()
        }))
    }
}

#[async_trait]
impl HubsWriteRepo for InMemoryRepositories {
    async fn create_hub(&self, params: NewHub) -> Result<HubRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        if state.hubs.values().any(|hub| hub.slug == params.slug) {
            return Err(duplicate("hubs_slug_key"));
        }
        if !state.categories.contains_key(&params.category_id) {
            return Err(foreign_key("hub category does not exist"));
        }
        let now = OffsetDateTime::now_utc();
        let hub = HubRecord {
            id: Uuid::new_v4(),
            slug: params.slug,
            name: params.name,
            description: params.description,
            image: params.image,
            link: params.link,
            status: params.status,
            category_id: params.category_id,
            created_at: now,
            updated_at: now,
        };
        state.hubs.insert(hub.id, hub.clone());
        Ok(hub)
    }

    async fn update_hub(&self, params: HubChanges) -> Result<HubRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&params.category_id) {
            return Err(foreign_key("hub category does not exist"));
        }
        let hub = state.hubs.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        hub.name = params.name;
        hub.description = params.description;
        hub.image = params.image;
        hub.link = params.link;
        hub.status = params.status;
        hub.category_id = params.category_id;
        hub.updated_at = OffsetDateTime::now_utc();
        Ok(hub.clone())
    }

    async fn update_hub_status(
        &self,
        id: Uuid,
        status: HubStatus,
    ) -> Result<HubRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        let hub = state.hubs.get_mut(&id).ok_or(RepoError::NotFound)?;
        hub.status = status;
        hub.updated_at = OffsetDateTime::now_utc();
        Ok(hub.clone())
    }

    async fn delete_hub(&self, id: Uuid) -> Result<HubRecord, RepoError> {
        self.wrote();
        self.state
            .write()
            .await
            .hubs
            .remove(&id)
            .ok_or(RepoError::NotFound)
    }

    async fn create_category(
        &self,
        slug: String,
        name: String,
    ) -> Result<HubCategoryRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        if state.categories.values().any(|c| c.slug == slug) {
            return Err(duplicate("hub_categories_slug_key"));
        }
        let now = OffsetDateTime::now_utc();
        let category = HubCategoryRecord {
            id: Uuid::new_v4(),
            slug,
            name,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: Uuid,
        name: String,
    ) -> Result<HubCategoryRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        let category = state.categories.get_mut(&id).ok_or(RepoError::NotFound)?;
        category.name = name;
        category.updated_at = OffsetDateTime::now_utc();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> Result<DeletedCategory, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        let category = state.categories.remove(&id).ok_or(RepoError::NotFound)?;
        let children: Vec<Uuid> = state
            .hubs
            .values()
            .filter(|hub| hub.category_id == id)
            .map(|hub| hub.id)
            .collect();
        let hubs = children
            .iter()
            .filter_map(|hub_id| state.hubs.remove(hub_id))
            .collect();
        Ok(DeletedCategory { category, hubs })
    }
}

#[async_trait]
impl UsersRepo for InMemoryRepositories {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        self.read();
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_session(&self, token: &str) -> Result<Option<UserRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        let now = OffsetDateTime::now_utc();
        Ok(state
            .sessions
            .get(token)
            .filter(|(_, expires_at)| *expires_at > now)
            .and_then(|(user_id, _)| state.users.get(user_id))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        self.read();
        let state = self.state.read().await;
        let users = state.users.values().cloned().collect();
        Ok(by_name(users, |user: &UserRecord| user.name.clone()))
    }
}

#[async_trait]
impl UsersWriteRepo for InMemoryRepositories {
    async fn update_profile(&self, params: ProfileChanges) -> Result<UserRecord, RepoError> {
        self.wrote();
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        user.name = params.name;
        user.image = params.image;
        user.bio = params.bio;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }
}

#[async_trait]
impl AppDataRepo for InMemoryRepositories {
    async fn load_app_data(&self) -> Result<Option<AppDataRecord>, RepoError> {
        self.read();
        Ok(self.state.read().await.app_data.clone())
    }

    async fn save_app_data(&self, record: AppDataRecord) -> Result<AppDataRecord, RepoError> {
        self.wrote();
        self.state.write().await.app_data = Some(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl StatsRepo for InMemoryRepositories {
    async fn content_counts(&self) -> Result<ContentCounts, RepoError> {
        self.read();
        let state = self.state.read().await;
        Ok(ContentCounts {
            articles: state.articles.len() as u64,
            users: state.users.len() as u64,
            communities: state.communities.len() as u64,
            products: state.products.len() as u64,
            hubs: state.hubs.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_category_hub(category_id: Uuid, slug: &str) -> NewHub {
        NewHub {
            slug: slug.to_string(),
            name: slug.to_string(),
            description: "hub".into(),
            image: None,
            link: None,
            status: HubStatus::Active,
            category_id,
        }
    }

    #[tokio::test]
    async fn deleting_category_cascades_to_hubs() {
        let repo = InMemoryRepositories::new();
        let category = repo
            .create_category("coworking".into(), "Coworking".into())
            .await
            .unwrap();
        repo.create_hub(new_category_hub(category.id, "ruang-a"))
            .await
            .unwrap();
        repo.create_hub(new_category_hub(category.id, "ruang-b"))
            .await
            .unwrap();

        let deleted = repo.delete_category(category.id).await.unwrap();
        assert_eq!(deleted.category.id, category.id);
        let mut slugs: Vec<_> = deleted.hubs.iter().map(|hub| hub.slug.as_str()).collect();
        slugs.sort_unstable();
        assert_eq!(slugs, ["ruang-a", "ruang-b"]);
        assert!(repo.list_hubs(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let repo = InMemoryRepositories::new();
        repo.create_category("kuliner".into(), "Kuliner".into())
            .await
            .unwrap();
        let err = repo
            .create_category("kuliner".into(), "Kuliner lagi".into())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resolve() {
        let repo = InMemoryRepositories::new();
        let now = OffsetDateTime::now_utc();
        let user = UserRecord {
            id: Uuid::new_v4(),
            name: "Sari".into(),
            email: "sari@example.com".into(),
            image: None,
            role: crate::domain::types::UserRole::Member,
            bio: None,
            created_at: now,
            updated_at: now,
        };
        repo.insert_user(user.clone()).await;
        repo.insert_session("live", user.id, now + time::Duration::hours(1))
            .await;
        repo.insert_session("stale", user.id, now - time::Duration::hours(1))
            .await;

        assert_eq!(repo.find_user_by_session("live").await.unwrap(), Some(user));
        assert_eq!(repo.find_user_by_session("stale").await.unwrap(), None);
    }
}
