use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::actions::Actor;
use crate::application::error::ErrorReport;
use crate::domain::entities::UserRecord;

use super::AppState;
use super::error::ApiError;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// The user behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor::from_user(&self.0)
    }
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Resolve `Authorization: Bearer <token>` to a [`CurrentUser`]. Missing or
/// unknown tokens leave the request anonymous.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = extract_token(request.headers().get(header::AUTHORIZATION));

    if let Some(token) = token {
        match state.services.users.resolve_session(&token).await {
            Ok(Some(user)) => {
                debug!(
                    target = "pemuda::http::session",
                    user_id = %user.id,
                    "session resolved"
                );
                request.extensions_mut().insert(CurrentUser(user));
            }
            Ok(None) => {}
            Err(err) => {
                error!(
                    target = "pemuda::http::session",
                    error = %err,
                    "session lookup failed"
                );
                return ApiError::repo("infra::http::session", err).into_response();
            }
        }
    }

    next.run(request).await
}

fn extract_token(value: Option<&header::HeaderValue>) -> Option<String> {
    let raw = value?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let user_id = request
        .extensions()
        .get::<CurrentUser>()
        .map(|user| user.0.id.to_string());

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "pemuda::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                user_id = user_id.as_deref().unwrap_or(""),
                "request failed",
            );
        } else {
            warn!(
                target = "pemuda::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                user_id = user_id.as_deref().unwrap_or(""),
                "client request error",
            );
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_extracted() {
        let value = HeaderValue::from_static("Bearer abc123");
        assert_eq!(extract_token(Some(&value)).as_deref(), Some("abc123"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        let basic = HeaderValue::from_static("Basic dXNlcjpwYXNz");
        let empty = HeaderValue::from_static("Bearer  ");
        assert!(extract_token(Some(&basic)).is_none());
        assert!(extract_token(Some(&empty)).is_none());
        assert!(extract_token(None).is_none());
    }
}
