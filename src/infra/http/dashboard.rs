//! Dashboard endpoints. Writes answer with an [`ActionOutcome`]; bodies are
//! decoded by hand so a malformed payload becomes `INVALID_DATA` rather than
//! an extractor rejection.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::application::actions::{ActionError, ActionOutcome, Actor, require_actor, require_admin};
use crate::application::app_data::AppDataInput;
use crate::application::articles::ArticleInput;
use crate::application::communities::CommunityInput;
use crate::application::error::ErrorReport;
use crate::application::hubs::{HubCategoryInput, HubInput};
use crate::application::products::ProductInput;
use crate::application::talents::TalentInput;
use crate::application::users::ProfileInput;

use super::AppState;
use super::error::ApiError;
use super::middleware::CurrentUser;
use super::models::{DataResponse, ProductView, StatusPayload, TalentView, views};

type Session = Option<Extension<CurrentUser>>;

fn actor_of(user: Session) -> Option<Actor> {
    user.map(|Extension(user)| user.actor())
}

/// Check the caller, then decode the JSON body.
fn decode<T: DeserializeOwned>(actor: Option<&Actor>, body: &Bytes) -> Result<T, ActionError> {
    require_actor(actor)?;
    serde_json::from_slice(body).map_err(|err| ActionError::InvalidData(err.to_string()))
}

fn outcome<T: Serialize>(result: Result<T, ActionError>) -> Response {
    let (status, report) = match &result {
        Ok(_) => (StatusCode::OK, None),
        Err(err) => {
            let status = err.status_code();
            (
                status,
                Some(ErrorReport::from_error("infra::http::dashboard", status, err)),
            )
        }
    };

    let mut response = (status, Json(ActionOutcome::from(result))).into_response();
    if let Some(report) = report {
        report.attach(&mut response);
    }
    response
}

fn admin_only(actor: Option<&Actor>) -> Result<(), ApiError> {
    require_admin(actor)
        .map(|_| ())
        .map_err(|_| ApiError::unauthorized())
}

pub async fn save_article(State(state): State<AppState>, user: Session, body: Bytes) -> Response {
    let actor = actor_of(user);
    let result = match decode::<ArticleInput>(actor.as_ref(), &body) {
        Ok(input) => {
            state
                .services
                .articles
                .save_article(actor.as_ref(), input)
                .await
        }
        Err(err) => Err(err),
    };
    outcome(result)
}

pub async fn set_article_status(
    State(state): State<AppState>,
    user: Session,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let actor = actor_of(user);
    let result = match decode::<StatusPayload>(actor.as_ref(), &body) {
        Ok(payload) => {
            state
                .services
                .articles
                .set_article_status(actor.as_ref(), &id, &payload.status)
                .await
        }
        Err(err) => Err(err),
    };
    outcome(result)
}

pub async fn delete_article(
    State(state): State<AppState>,
    user: Session,
    Path(id): Path<String>,
) -> Response {
    let actor = actor_of(user);
    outcome(
        state
            .services
            .articles
            .delete_article(actor.as_ref(), &id)
            .await,
    )
}

pub async fn save_product(State(state): State<AppState>, user: Session, body: Bytes) -> Response {
    let actor = actor_of(user);
    let result = match decode::<ProductInput>(actor.as_ref(), &body) {
        Ok(input) => {
            state
                .services
                .products
                .save_product(actor.as_ref(), input)
                .await
        }
        Err(err) => Err(err),
    };
    outcome(result.map(ProductView::from))
}

pub async fn set_product_status(
    State(state): State<AppState>,
    user: Session,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let actor = actor_of(user);
    let result = match decode::<StatusPayload>(actor.as_ref(), &body) {
        Ok(payload) => {
            state
                .services
                .products
                .set_product_status(actor.as_ref(), &id, &payload.status)
                .await
        }
        Err(err) => Err(err),
    };
    outcome(result.map(ProductView::from))
}

pub async fn delete_product(
    State(state): State<AppState>,
    user: Session,
    Path(id): Path<String>,
) -> Response {
    let actor = actor_of(user);
    outcome(
        state
            .services
            .products
            .delete_product(actor.as_ref(), &id)
            .await
            .map(ProductView::from),
    )
}

pub async fn save_talent(State(state): State<AppState>, user: Session, body: Bytes) -> Response {
    let actor = actor_of(user);
    let result = match decode::<TalentInput>(actor.as_ref(), &body) {
        Ok(input) => {
            state
                .services
                .talents
                .save_talent(actor.as_ref(), input)
                .await
        }
        Err(err) => Err(err),
    };
    outcome(result.map(TalentView::from))
}

pub async fn set_talent_status(
    State(state): State<AppState>,
    user: Session,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let actor = actor_of(user);
    let result = match decode::<StatusPayload>(actor.as_ref(), &body) {
        Ok(payload) => {
            state
                .services
                .talents
                .set_talent_status(actor.as_ref(), &id, &payload.status)
                .await
        }
        Err(err) => Err(err),
    };
    outcome(result.map(TalentView::from))
}

pub async fn save_community(State(state): State<AppState>, user: Session, body: Bytes) -> Response {
    let actor = actor_of(user);
    let result = match decode::<CommunityInput>(actor.as_ref(), &body) {
        Ok(input) => {
            state
                .services
                .communities
                .save_community(actor.as_ref(), input)
                .await
        }
        Err(err) => Err(err),
    };
    outcome(result)
}

pub async fn set_community_status(
    State(state): State<AppState>,
    user: Session,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let actor = actor_of(user);
    let result = match decode::<StatusPayload>(actor.as_ref(), &body) {
        Ok(payload) => {
            state
                .services
                .communities
                .set_community_status(actor.as_ref(), &id, &payload.status)
                .await
        }
        Err(err) => Err(err),
    };
    outcome(result)
}

pub async fn save_hub(State(state): State<AppState>, user: Session, body: Bytes) -> Response {
    let actor = actor_of(user);
    let result = match decode::<HubInput>(actor.as_ref(), &body) {
        Ok(input) => state.services.hubs.save_hub(actor.as_ref(), input).await,
        Err(err) => Err(err),
    };
    outcome(result)
}

pub async fn set_hub_status(
    State(state): State<AppState>,
    user: Session,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let actor = actor_of(user);
    let result = match decode::<StatusPayload>(actor.as_ref(), &body) {
        Ok(payload) => {
            state
                .services
                .hubs
                .set_hub_status(actor.as_ref(), &id, &payload.status)
                .await
        }
        Err(err) => Err(err),
    };
    outcome(result)
}

pub async fn delete_hub(
    State(state): State<AppState>,
    user: Session,
    Path(id): Path<String>,
) -> Response {
    let actor = actor_of(user);
    outcome(state.services.hubs.delete_hub(actor.as_ref(), &id).await)
}

pub async fn save_hub_category(
    State(state): State<AppState>,
    user: Session,
    body: Bytes,
) -> Response {
    let actor = actor_of(user);
    let result = match decode::<HubCategoryInput>(actor.as_ref(), &body) {
        Ok(input) => state.services.hubs.save_category(actor.as_ref(), input).await,
        Err(err) => Err(err),
    };
    outcome(result)
}

pub async fn delete_hub_category(
    State(state): State<AppState>,
    user: Session,
    Path(id): Path<String>,
) -> Response {
    let actor = actor_of(user);
    outcome(
        state
            .services
            .hubs
            .delete_category(actor.as_ref(), &id)
            .await,
    )
}

pub async fn save_app_data(State(state): State<AppState>, user: Session, body: Bytes) -> Response {
    let actor = actor_of(user);
    let result = match decode::<AppDataInput>(actor.as_ref(), &body) {
        Ok(input) => state.services.app_data.save(actor.as_ref(), input).await,
        Err(err) => Err(err),
    };
    outcome(result)
}

pub async fn update_profile(State(state): State<AppState>, user: Session, body: Bytes) -> Response {
    let actor = actor_of(user);
    let result = match decode::<ProfileInput>(actor.as_ref(), &body) {
        Ok(input) => {
            state
                .services
                .users
                .update_profile(actor.as_ref(), input)
                .await
        }
        Err(err) => Err(err),
    };
    outcome(result)
}

pub async fn list_articles(
    State(state): State<AppState>,
    user: Session,
) -> Result<impl IntoResponse, ApiError> {
    admin_only(actor_of(user).as_ref())?;
    let articles = state.services.articles.all_articles().await?;
    Ok(Json(DataResponse::new(articles)))
}

pub async fn list_products(
    State(state): State<AppState>,
    user: Session,
) -> Result<impl IntoResponse, ApiError> {
    admin_only(actor_of(user).as_ref())?;
    let products = state.services.products.all_products().await?;
    Ok(Json(DataResponse::new(views::<_, ProductView>(products))))
}

pub async fn list_talents(
    State(state): State<AppState>,
    user: Session,
) -> Result<impl IntoResponse, ApiError> {
    admin_only(actor_of(user).as_ref())?;
    let talents = state.services.talents.all_talents().await?;
    Ok(Json(DataResponse::new(views::<_, TalentView>(talents))))
}

pub async fn list_communities(
    State(state): State<AppState>,
    user: Session,
) -> Result<impl IntoResponse, ApiError> {
    admin_only(actor_of(user).as_ref())?;
    let communities = state.services.communities.all_communities().await?;
    Ok(Json(DataResponse::new(communities)))
}

pub async fn list_users(
    State(state): State<AppState>,
    user: Session,
) -> Result<impl IntoResponse, ApiError> {
    admin_only(actor_of(user).as_ref())?;
    let users = state.services.users.all_users().await?;
    Ok(Json(DataResponse::new(users)))
}
