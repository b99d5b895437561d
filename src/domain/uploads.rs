//! Rules for user-submitted images.

use thiserror::Error;

/// Accepted MIME types and the extension stored for each.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageRejection {
    #[error("unsupported image type `{0}`")]
    UnsupportedType(String),
    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("image is empty")]
    Empty,
}

/// File extension for an accepted image MIME type.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Extension for `content_type`, or the rejection for an unsupported type.
pub fn accepted_extension(content_type: &str) -> Result<&'static str, ImageRejection> {
    image_extension(content_type)
        .ok_or_else(|| ImageRejection::UnsupportedType(content_type.to_string()))
}

/// Size rule: non-empty and at most `limit` bytes.
pub fn check_image_size(size: u64, limit: u64) -> Result<(), ImageRejection> {
    if size == 0 {
        return Err(ImageRejection::Empty);
    }
    if size > limit {
        return Err(ImageRejection::TooLarge { limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_image_types() {
        assert_eq!(accepted_extension("image/png"), Ok("png"));
        assert_eq!(accepted_extension("IMAGE/JPEG; charset=binary"), Ok("jpg"));
    }

    #[test]
    fn rejects_other_types() {
        assert_eq!(
            accepted_extension("application/pdf"),
            Err(ImageRejection::UnsupportedType("application/pdf".into()))
        );
    }

    #[test]
    fn enforces_size_bounds() {
        assert_eq!(check_image_size(0, 16), Err(ImageRejection::Empty));
        assert_eq!(check_image_size(16, 16), Ok(()));
        assert_eq!(
            check_image_size(17, 16),
            Err(ImageRejection::TooLarge { limit: 16 })
        );
    }
}
