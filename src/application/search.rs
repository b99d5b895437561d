use serde::Serialize;

use crate::application::articles::ArticleService;
use crate::application::products::ProductService;
use crate::application::repos::RepoError;
use crate::application::talents::TalentService;
use crate::domain::entities::{ArticleCard, ProductRecord, TalentRecord};
use crate::domain::search::{Scored, SearchQuery, WeightedField, rank};

const RESULT_LIMIT: usize = 20;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub articles: Vec<ArticleCard>,
    pub products: Vec<ProductRecord>,
    pub talents: Vec<TalentRecord>,
}

/// Weighted search over public content, served from the cached listings.
#[derive(Clone)]
pub struct SearchService {
    articles: ArticleService,
    products: ProductService,
    talents: TalentService,
}

impl SearchService {
    pub fn new(articles: ArticleService, products: ProductService, talents: TalentService) -> Self {
        Self {
            articles,
            products,
            talents,
        }
    }

    pub async fn search(&self, raw: &str) -> Result<SearchResults, RepoError> {
        let query = SearchQuery::parse(raw);
        if query.is_empty() {
            return Ok(SearchResults::default());
        }

        let articles = rank(
            &query,
            self.articles.published_articles().await?,
            |article: &ArticleCard| {
                vec![
                    WeightedField::new(&article.title, 3),
                    WeightedField::new(&article.excerpt, 1),
                ]
            },
            |article| article.title.as_str(),
        );
        let products = rank(
            &query,
            self.products.published_products().await?,
            |product: &ProductRecord| {
                vec![
                    WeightedField::new(&product.name, 3),
                    WeightedField::new(&product.category, 2),
                    WeightedField::new(&product.description, 1),
                ]
            },
            |product| product.name.as_str(),
        );
        let talents = rank(
            &query,
            self.talents.approved_talents().await?,
            |talent: &TalentRecord| {
                vec![
                    WeightedField::new(&talent.name, 3),
                    WeightedField::new(&talent.profession, 2),
                    WeightedField::new(&talent.industry, 1),
                ]
            },
            |talent| talent.name.as_str(),
        );

        Ok(SearchResults {
            articles: top(articles),
            products: top(products),
            talents: top(talents),
        })
    }
}

fn top<T>(scored: Vec<Scored<T>>) -> Vec<T> {
    scored
        .into_iter()
        .take(RESULT_LIMIT)
        .map(|hit| hit.item)
        .collect()
}
