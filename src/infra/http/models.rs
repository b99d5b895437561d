use serde::{Deserialize, Serialize};

use crate::application::search::SearchResults;
use crate::domain::badge::badge_color;
use crate::domain::entities::{
    ArticleCard, HubCategoryRecord, HubRecord, ProductRecord, TalentProfile, TalentRecord,
};

/// `{ "data": ... }` envelope used by every read endpoint.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub key: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub badge_color: &'static str,
}

impl From<ProductRecord> for ProductView {
    fn from(product: ProductRecord) -> Self {
        let badge_color = badge_color(&product.category);
        Self {
            product,
            badge_color,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TalentView {
    #[serde(flatten)]
    pub talent: TalentRecord,
    pub badge_color: &'static str,
}

impl From<TalentRecord> for TalentView {
    fn from(talent: TalentRecord) -> Self {
        let badge_color = badge_color(&talent.industry);
        Self {
            talent,
            badge_color,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TalentProfileView {
    pub talent: TalentView,
    pub products: Vec<ProductView>,
    pub articles: Vec<ArticleCard>,
}

impl From<TalentProfile> for TalentProfileView {
    fn from(profile: TalentProfile) -> Self {
        Self {
            talent: profile.talent.into(),
            products: views(profile.products),
            articles: profile.articles,
        }
    }
}

/// Hub category with its hubs in display order.
#[derive(Debug, Serialize)]
pub struct HubCategoryView {
    #[serde(flatten)]
    pub category: HubCategoryRecord,
    pub hubs: Vec<HubRecord>,
}

#[derive(Debug, Serialize)]
pub struct SearchView {
    pub articles: Vec<ArticleCard>,
    pub products: Vec<ProductView>,
    pub talents: Vec<TalentView>,
}

impl From<SearchResults> for SearchView {
    fn from(results: SearchResults) -> Self {
        Self {
            articles: results.articles,
            products: views(results.products),
            talents: views(results.talents),
        }
    }
}

pub fn views<T, V: From<T>>(items: Vec<T>) -> Vec<V> {
    items.into_iter().map(V::from).collect()
}
