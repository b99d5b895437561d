use crate::application::app_data::AppDataService;
use crate::application::articles::ArticleService;
use crate::application::communities::CommunityService;
use crate::application::health::HealthService;
use crate::application::hubs::HubService;
use crate::application::products::ProductService;
use crate::application::profiles::ProfileService;
use crate::application::repos::Repositories;
use crate::application::search::SearchService;
use crate::application::talents::TalentService;
use crate::application::users::UserService;
use crate::cache::CacheTrigger;

/// Every service, wired to one backend and one cache.
#[derive(Clone)]
pub struct Services {
    pub articles: ArticleService,
    pub products: ProductService,
    pub talents: TalentService,
    pub communities: CommunityService,
    pub hubs: HubService,
    pub users: UserService,
    pub app_data: AppDataService,
    pub profiles: ProfileService,
    pub search: SearchService,
    pub health: HealthService,
    pub trigger: CacheTrigger,
}

impl Services {
    pub fn new(repos: &Repositories, trigger: CacheTrigger) -> Self {
        let articles = ArticleService::new(
            repos.articles.clone(),
            repos.articles_write.clone(),
            trigger.clone(),
        );
        let products = ProductService::new(
            repos.products.clone(),
            repos.products_write.clone(),
            repos.talents.clone(),
            trigger.clone(),
        );
        let talents = TalentService::new(
            repos.talents.clone(),
            repos.talents_write.clone(),
            trigger.clone(),
        );
        let communities = CommunityService::new(
            repos.communities.clone(),
            repos.communities_write.clone(),
            trigger.clone(),
        );
        let hubs = HubService::new(repos.hubs.clone(), repos.hubs_write.clone(), trigger.clone());
        let users = UserService::new(
            repos.users.clone(),
            repos.users_write.clone(),
            trigger.clone(),
        );
        let app_data = AppDataService::new(repos.app_data.clone(), trigger.clone());
        let profiles = ProfileService::new(
            talents.clone(),
            communities.clone(),
            products.clone(),
            articles.clone(),
        );
        let search = SearchService::new(articles.clone(), products.clone(), talents.clone());
        let health = HealthService::new(repos.stats.clone());

        Self {
            articles,
            products,
            talents,
            communities,
            hubs,
            users,
            app_data,
            profiles,
            search,
            health,
            trigger,
        }
    }
}
