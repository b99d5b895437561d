//! Public read endpoints. Everything here is served through the cached
//! read accessors.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::application::error::ErrorReport;
use crate::domain::entities::ContentCounts;
use crate::infra::uploads::UploadStorageError;

use super::AppState;
use super::error::ApiError;
use super::middleware::CurrentUser;
use super::models::{
    DataResponse, HubCategoryView, ProductView, SearchParams, SearchView, TalentProfileView,
    TalentView, views,
};

#[derive(Debug, Serialize)]
struct HealthBody {
    message: &'static str,
    count: ContentCounts,
}

#[derive(Debug, Serialize)]
struct HealthFailureBody {
    message: &'static str,
    error: String,
}

pub async fn healthz(State(state): State<AppState>) -> Response {
    match state.services.health.counts().await {
        Ok(count) => (
            StatusCode::OK,
            Json(HealthBody {
                message: "OK",
                count,
            }),
        )
            .into_response(),
        Err(err) => {
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            let mut response = (
                status,
                Json(HealthFailureBody {
                    message: "Database connection failed",
                    error: err.to_string(),
                }),
            )
                .into_response();
            ErrorReport::from_error("infra::http::healthz", status, &err).attach(&mut response);
            response
        }
    }
}

fn parse_uuid(raw: &str, message: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::not_found(message))
}

pub async fn article_by_id(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_uuid(&id, "Article not found")?;
    let viewer = user.map(|Extension(user)| user.actor());
    let article = state
        .services
        .articles
        .visible_article_by_id(viewer.as_ref(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;
    Ok(Json(DataResponse::new(article)))
}

pub async fn product_by_id(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_uuid(&id, "Product not found")?;
    let viewer = user.map(|Extension(user)| user.actor());
    let product = state
        .services
        .products
        .visible_product_by_id(viewer.as_ref(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Json(DataResponse::new(ProductView::from(product))))
}

pub async fn current_profile(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Extension(user)) = user else {
        return Err(ApiError::unauthorized());
    };
    let profile = state
        .services
        .users
        .user_by_id(user.0.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(DataResponse::new(profile)))
}

pub async fn current_community(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Extension(user)) = user else {
        return Err(ApiError::unauthorized());
    };
    let community = state
        .services
        .communities
        .community_by_user(user.0.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Community not found"))?;
    Ok(Json(DataResponse::new(community)))
}

pub async fn app_data(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let data = state.services.app_data.load().await?;
    Ok(Json(DataResponse::new(data)))
}

pub async fn list_articles(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let articles = state.services.articles.published_articles().await?;
    Ok(Json(DataResponse::new(articles)))
}

pub async fn article_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state
        .services
        .articles
        .public_article(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;
    Ok(Json(DataResponse::new(article)))
}

pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state.services.products.published_products().await?;
    Ok(Json(DataResponse::new(views::<_, ProductView>(products))))
}

pub async fn product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .public_product(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Json(DataResponse::new(ProductView::from(product))))
}

pub async fn list_talents(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let talents = state.services.talents.approved_talents().await?;
    Ok(Json(DataResponse::new(views::<_, TalentView>(talents))))
}

pub async fn talent_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .services
        .profiles
        .talent_profile(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Talent not found"))?;
    Ok(Json(DataResponse::new(TalentProfileView::from(profile))))
}

pub async fn list_communities(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let communities = state.services.communities.approved_communities().await?;
    Ok(Json(DataResponse::new(communities)))
}

pub async fn community_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .services
        .profiles
        .community_profile(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Community not found"))?;
    Ok(Json(DataResponse::new(profile)))
}

pub async fn list_hubs(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let hubs = state.services.hubs.hubs().await?;
    Ok(Json(DataResponse::new(hubs)))
}

pub async fn hub_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let hub = state
        .services
        .hubs
        .hub_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Hub not found"))?;
    Ok(Json(DataResponse::new(hub)))
}

pub async fn list_hub_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.services.hubs.categories().await?;
    Ok(Json(DataResponse::new(categories)))
}

pub async fn hub_category_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let hubs = &state.services.hubs;
    let category = hubs
        .category_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Hub category not found"))?;
    let members = hubs.hubs_in_category(category.id).await?;
    Ok(Json(DataResponse::new(HubCategoryView {
        category,
        hubs: members,
    })))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state.services.search.search(&params.q).await?;
    Ok(Json(DataResponse::new(SearchView::from(results))))
}

/// Serve a stored upload by key.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let data = match state.uploads.read(&key).await {
        Ok(data) => data,
        Err(UploadStorageError::InvalidPath) => return Err(ApiError::not_found("File not found")),
        Err(UploadStorageError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("File not found"));
        }
        Err(err) => return Err(ApiError::upload(err)),
    };

    let mime = mime_guess::from_path(&key).first_or_octet_stream();
    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        data,
    )
        .into_response())
}
