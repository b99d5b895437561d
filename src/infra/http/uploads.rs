use axum::Json;
use axum::extract::{Multipart, State};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures::TryStreamExt;
use tracing::info;

use crate::infra::uploads::UploadStorageError;

use super::AppState;
use super::error::ApiError;
use super::models::UploadResponse;

const IMAGE_FIELD: &str = "image";

/// Accept a multipart `image` field and stream it to upload storage.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .or_else(|| {
                field
                    .file_name()
                    .and_then(|name| mime_guess::from_path(name).first())
                    .map(|mime| mime.essence_str().to_string())
            })
            .ok_or_else(|| ApiError::bad_request("Missing content type", "no content type"))?;

        let stream = field.map_err(stream_error);
        let stored = state
            .uploads
            .store_image(&content_type, stream)
            .await
            .map_err(ApiError::upload)?;

        info!(
            target = "pemuda::http::uploads",
            key = %stored.key,
            size_bytes = stored.size_bytes,
            checksum = %stored.checksum,
            "image uploaded"
        );

        return Ok((
            StatusCode::OK,
            Json(UploadResponse {
                key: stored.key,
                url: stored.url,
            }),
        ));
    }

    Err(ApiError::bad_request("No image provided", "missing `image` field"))
}

fn stream_error(err: MultipartError) -> UploadStorageError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadStorageError::PayloadTooLarge {
            source: Box::new(err),
        }
    } else {
        UploadStorageError::PayloadStream {
            source: Box::new(err),
        }
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::upload(stream_error(err))
}
