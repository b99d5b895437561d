//! Public detail pages assembled from individually cached reads.
//!
//! Composites are not cached themselves; each part is, under its own tags, so
//! a write to any part is visible on the next page load.

use crate::application::articles::ArticleService;
use crate::application::communities::CommunityService;
use crate::application::products::ProductService;
use crate::application::repos::RepoError;
use crate::application::talents::TalentService;
use crate::domain::entities::{CommunityProfile, TalentProfile};

#[derive(Clone)]
pub struct ProfileService {
    talents: TalentService,
    communities: CommunityService,
    products: ProductService,
    articles: ArticleService,
}

impl ProfileService {
    pub fn new(
        talents: TalentService,
        communities: CommunityService,
        products: ProductService,
        articles: ArticleService,
    ) -> Self {
        Self {
            talents,
            communities,
            products,
            articles,
        }
    }

    /// Approved talent with published products and articles.
    pub async fn talent_profile(&self, slug: &str) -> Result<Option<TalentProfile>, RepoError> {
        let Some(talent) = self.talents.talent_by_slug(slug).await? else {
            return Ok(None);
        };
        if !talent.status.is_public() {
            return Ok(None);
        }

        let products = self.products.published_products_by_talent(talent.id).await?;
        let articles = self
            .articles
            .published_articles_by_author(talent.user_id)
            .await?;
        Ok(Some(TalentProfile {
            talent,
            products,
            articles,
        }))
    }

    /// Approved community with its published articles.
    pub async fn community_profile(
        &self,
        slug: &str,
    ) -> Result<Option<CommunityProfile>, RepoError> {
        let Some(community) = self.communities.community_by_slug(slug).await? else {
            return Ok(None);
        };
        if !community.status.is_public() {
            return Ok(None);
        }

        let articles = self
            .articles
            .published_articles_by_community(community.id)
            .await?;
        Ok(Some(CommunityProfile {
            community,
            articles,
        }))
    }
}
