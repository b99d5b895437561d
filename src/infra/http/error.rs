use std::error::Error as StdError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;
use crate::infra::uploads::UploadStorageError;

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: &'static str,
}

/// Error returned by read endpoints as `{ "error": <message> }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &'static str, detail: impl Into<String>) -> Self {
        Self {
            status,
            message,
            report: ErrorReport::from_message("infra::http", status, detail),
        }
    }

    fn with_source(
        status: StatusCode,
        message: &'static str,
        source: &'static str,
        error: &dyn StdError,
    ) -> Self {
        Self {
            status,
            message,
            report: ErrorReport::from_error(source, status, error),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", "no session")
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, message)
    }

    pub fn bad_request(message: &'static str, detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, detail)
    }

    pub fn repo(source: &'static str, err: RepoError) -> Self {
        let (status, message) = match &err {
            RepoError::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            RepoError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "Invalid input"),
            RepoError::Timeout => (StatusCode::SERVICE_UNAVAILABLE, "Database timeout"),
            RepoError::Duplicate { .. } | RepoError::Integrity { .. } => {
                (StatusCode::CONFLICT, "Conflicting record")
            }
            RepoError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        Self::with_source(status, message, source, &err)
    }

    pub fn upload(err: UploadStorageError) -> Self {
        let (status, message) = if err.is_too_large() {
            (StatusCode::PAYLOAD_TOO_LARGE, "File too large")
        } else if err.is_client_error() && !matches!(err, UploadStorageError::InvalidPath) {
            (StatusCode::BAD_REQUEST, "Invalid image upload")
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to store upload")
        };
        Self::with_source(status, message, "infra::http::uploads", &err)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        Self::repo("infra::http", err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ApiErrorBody {
                error: self.message,
            }),
        )
            .into_response();
        self.report.attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::uploads::ImageRejection;

    #[test]
    fn oversized_upload_maps_to_413() {
        let err = ApiError::upload(UploadStorageError::Rejected(ImageRejection::TooLarge {
            limit: 10,
        }));
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn unsupported_type_maps_to_400() {
        let err = ApiError::upload(UploadStorageError::Rejected(
            ImageRejection::UnsupportedType("text/plain".into()),
        ));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_failure_maps_to_500() {
        let err = ApiError::upload(UploadStorageError::Io(std::io::Error::other("disk full")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_carries_report() {
        let response = ApiError::not_found("Article not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<ErrorReport>().is_some());
    }
}
