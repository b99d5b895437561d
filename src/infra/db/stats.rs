use async_trait::async_trait;

use crate::{
    application::repos::{RepoError, StatsRepo},
    domain::entities::ContentCounts,
};

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct CountsRow {
    articles: i64,
    users: i64,
    communities: i64,
    products: i64,
    hubs: i64,
}

#[async_trait]
impl StatsRepo for PostgresRepositories {
    async fn content_counts(&self) -> Result<ContentCounts, RepoError> {
        let row = sqlx::query_as::<_, CountsRow>(
            "SELECT \
                 (SELECT COUNT(*) FROM articles) AS articles, \
                 (SELECT COUNT(*) FROM users) AS users, \
                 (SELECT COUNT(*) FROM communities) AS communities, \
                 (SELECT COUNT(*) FROM products) AS products, \
                 (SELECT COUNT(*) FROM hubs) AS hubs",
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ContentCounts {
            articles: Self::convert_count(row.articles)?,
            users: Self::convert_count(row.users)?,
            communities: Self::convert_count(row.communities)?,
            products: Self::convert_count(row.products)?,
            hubs: Self::convert_count(row.hubs)?,
        })
    }
}
