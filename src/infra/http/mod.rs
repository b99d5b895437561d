//! HTTP surface: public JSON reads, dashboard mutations, uploads.

mod dashboard;
pub mod error;
pub mod middleware;
pub mod models;
mod public;
mod uploads;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};

use crate::application::services::Services;
use crate::infra::uploads::UploadStorage;

use middleware::{log_responses, resolve_session, set_request_context};

/// Room for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub uploads: Arc<UploadStorage>,
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = usize::try_from(
        state
            .uploads
            .max_bytes()
            .saturating_add(MULTIPART_OVERHEAD_BYTES),
    )
    .unwrap_or(usize::MAX);
    let cdn_route = format!("{}/{{*key}}", state.uploads.route_prefix());

    Router::new()
        .route("/api/healthz", get(public::healthz))
        .route("/api/article/{id}", get(public::article_by_id))
        .route("/api/product/{id}", get(public::product_by_id))
        .route("/api/profile", get(public::current_profile))
        .route("/api/community", get(public::current_community))
        .route("/api/app-data", get(public::app_data))
        .route("/api/upload", post(uploads::upload_image))
        .route("/api/articles", get(public::list_articles))
        .route("/api/articles/slug/{slug}", get(public::article_by_slug))
        .route("/api/products", get(public::list_products))
        .route("/api/products/slug/{slug}", get(public::product_by_slug))
        .route("/api/talents", get(public::list_talents))
        .route("/api/talents/slug/{slug}", get(public::talent_by_slug))
        .route("/api/communities", get(public::list_communities))
        .route(
            "/api/communities/slug/{slug}",
            get(public::community_by_slug),
        )
        .route("/api/hubs", get(public::list_hubs))
        .route("/api/hubs/slug/{slug}", get(public::hub_by_slug))
        .route("/api/hub-categories", get(public::list_hub_categories))
        .route(
            "/api/hub-categories/slug/{slug}",
            get(public::hub_category_by_slug),
        )
        .route("/api/search", get(public::search))
        .route(&cdn_route, get(public::serve_upload))
        .merge(dashboard_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            resolve_session,
        ))
        .layer(axum_middleware::from_fn(set_request_context))
        .with_state(state)
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/dashboard/articles",
            get(dashboard::list_articles).post(dashboard::save_article),
        )
        .route(
            "/api/dashboard/articles/{id}",
            delete(dashboard::delete_article),
        )
        .route(
            "/api/dashboard/articles/{id}/status",
            post(dashboard::set_article_status),
        )
        .route(
            "/api/dashboard/products",
            get(dashboard::list_products).post(dashboard::save_product),
        )
        .route(
            "/api/dashboard/products/{id}",
            delete(dashboard::delete_product),
        )
        .route(
            "/api/dashboard/products/{id}/status",
            post(dashboard::set_product_status),
        )
        .route(
            "/api/dashboard/talents",
            get(dashboard::list_talents).post(dashboard::save_talent),
        )
        .route(
            "/api/dashboard/talents/{id}/status",
            post(dashboard::set_talent_status),
        )
        .route(
            "/api/dashboard/communities",
            get(dashboard::list_communities).post(dashboard::save_community),
        )
        .route(
            "/api/dashboard/communities/{id}/status",
            post(dashboard::set_community_status),
        )
        .route("/api/dashboard/hubs", post(dashboard::save_hub))
        .route("/api/dashboard/hubs/{id}", delete(dashboard::delete_hub))
        .route(
            "/api/dashboard/hubs/{id}/status",
            post(dashboard::set_hub_status),
        )
        .route(
            "/api/dashboard/hub-categories",
            post(dashboard::save_hub_category),
        )
        .route(
            "/api/dashboard/hub-categories/{id}",
            delete(dashboard::delete_hub_category),
        )
        .route("/api/dashboard/app-data", post(dashboard::save_app_data))
        .route("/api/dashboard/profile", post(dashboard::update_profile))
        .route("/api/dashboard/users", get(dashboard::list_users))
}
