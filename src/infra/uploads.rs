//! Filesystem storage for uploaded images.

use std::error::Error as StdError;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt, pin_mut};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::uploads::{ImageRejection, accepted_extension, check_image_size};

#[derive(Debug, Error)]
pub enum UploadStorageError {
    #[error("invalid stored path")]
    InvalidPath,
    #[error(transparent)]
    Rejected(#[from] ImageRejection),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("uploaded file exceeds configured body limit")]
    PayloadTooLarge {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("uploaded file stream failed")]
    PayloadStream {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl UploadStorageError {
    /// Whether the failure is the client's fault rather than ours.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, UploadStorageError::Io(_))
    }

    pub fn is_too_large(&self) -> bool {
        matches!(
            self,
            UploadStorageError::PayloadTooLarge { .. }
                | UploadStorageError::Rejected(ImageRejection::TooLarge { .. })
        )
    }
}

/// A stored image and the public address it is served from.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
    pub checksum: String,
    pub size_bytes: u64,
}

#[derive(Debug)]
pub struct UploadStorage {
    root: PathBuf,
    public_base: String,
    route_prefix: String,
    max_bytes: u64,
}

impl UploadStorage {
    /// Storage rooted at `root`, created if missing. Stored keys are served
    /// from `{base_url}{cdn_path}/{key}`.
    pub fn new(
        root: PathBuf,
        base_url: &str,
        cdn_path: &str,
        max_bytes: u64,
    ) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        let route_prefix = format!("/{}", cdn_path.trim_matches('/'));
        let public_base = format!("{}{route_prefix}", base_url.trim_end_matches('/'));
        Ok(Self {
            root,
            public_base,
            route_prefix,
            max_bytes,
        })
    }

    /// Path under which stored keys are served, e.g. `/cdn`.
    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base)
    }

    /// Stream an image to disk under a fresh `YYYY/MM/DD/<uuid>.<ext>` key.
    ///
    /// The type is checked before anything is written; the size is checked
    /// while streaming and a partial file is removed on any failure.
    pub async fn store_image<S>(
        &self,
        content_type: &str,
        stream: S,
    ) -> Result<StoredImage, UploadStorageError>
    where
        S: Stream<Item = Result<Bytes, UploadStorageError>>,
    {
        let extension = accepted_extension(content_type)?;
        let key = build_key(extension);
        let absolute = self.resolve(&key)?;

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&absolute).await?;
        let written = self.write_chunks(&mut file, stream).await;
        drop(file);

        let (size_bytes, checksum) = match written {
            Ok(written) => written,
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&absolute).await {
                    warn!(
                        target = "pemuda::infra::uploads",
                        key = %key,
                        error = %cleanup,
                        "failed to remove partial upload"
                    );
                }
                return Err(err);
            }
        };

        debug!(
            target = "pemuda::infra::uploads",
            key = %key,
            size_bytes,
            "image stored"
        );

        Ok(StoredImage {
            url: self.public_url(&key),
            key,
            checksum,
            size_bytes,
        })
    }

    /// Copy `stream` into `file`, returning the byte count and sha256 hex.
    async fn write_chunks<S>(
        &self,
        file: &mut fs::File,
        stream: S,
    ) -> Result<(u64, String), UploadStorageError>
    where
        S: Stream<Item = Result<Bytes, UploadStorageError>>,
    {
        let mut hasher = Sha256::new();
        let mut total_bytes: u64 = 0;

        pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            total_bytes = total_bytes.saturating_add(chunk.len() as u64);
            if total_bytes > self.max_bytes {
                return Err(ImageRejection::TooLarge {
                    limit: self.max_bytes,
                }
                .into());
            }
            file.write_all(&chunk).await?;
            hasher.update(&chunk);
        }
        file.flush().await?;
        check_image_size(total_bytes, self.max_bytes)?;

        Ok((total_bytes, hex::encode(hasher.finalize().as_slice())))
    }

    pub async fn read(&self, key: &str) -> Result<Bytes, UploadStorageError> {
        let absolute = self.resolve(key)?;
        let data = fs::read(absolute).await?;
        Ok(Bytes::from(data))
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, UploadStorageError> {
        let relative = Path::new(key);
        if key.is_empty()
            || relative.is_absolute()
            || relative.components().any(|component| {
                matches!(
                    component,
                    Component::ParentDir | Component::Prefix(_) | Component::RootDir
                )
            })
        {
            return Err(UploadStorageError::InvalidPath);
        }

        Ok(self.root.join(relative))
    }
}

fn build_key(extension: &str) -> String {
    let (year, month, day) = time::OffsetDateTime::now_utc().to_calendar_date();
    format!(
        "{year}/{:02}/{day:02}/{}.{extension}",
        month as u8,
        Uuid::new_v4()
    )
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;

    fn body(
        chunks: Vec<Result<Bytes, UploadStorageError>>,
    ) -> impl Stream<Item = Result<Bytes, UploadStorageError>> {
        stream::iter(chunks)
    }

    fn storage(dir: &tempfile::TempDir, max_bytes: u64) -> UploadStorage {
        UploadStorage::new(
            dir.path().to_path_buf(),
            "http://localhost:3000/",
            "/cdn",
            max_bytes,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn stores_image_under_dated_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir, 1024);

        let stored = storage
            .store_image("image/png", body(vec![Ok(Bytes::from_static(b"\x89PNG fake"))]))
            .await
            .unwrap();

        let parts: Vec<_> = stored.key.split('/').collect();
        assert_eq!(parts.len(), 4);
        assert!(parts[3].ends_with(".png"));
        assert_eq!(
            stored.url,
            format!("http://localhost:3000/cdn/{}", stored.key)
        );
        assert_eq!(stored.checksum.len(), 64);
        assert_eq!(
            storage.read(&stored.key).await.unwrap(),
            Bytes::from_static(b"\x89PNG fake")
        );
    }

    #[tokio::test]
    async fn rejects_oversized_payload_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir, 4);

        let err = storage
            .store_image("image/gif", body(vec![Ok(Bytes::from_static(b"GIF89a"))]))
            .await
            .unwrap_err();
        assert!(err.is_too_large());

        let entries = walk(dir.path());
        assert!(entries.is_empty(), "partial file left behind: {entries:?}");
    }

    #[tokio::test]
    async fn failed_stream_after_written_chunk_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir, 1024);

        let err = storage
            .store_image(
                "image/webp",
                body(vec![
                    Ok(Bytes::from_static(b"RIFF")),
                    Err(UploadStorageError::PayloadStream {
                        source: "connection reset".into(),
                    }),
                ]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UploadStorageError::PayloadStream { .. }));

        let entries = walk(dir.path());
        assert!(entries.is_empty(), "partial file left behind: {entries:?}");
    }

    #[tokio::test]
    async fn empty_upload_is_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir, 1024);

        let err = storage.store_image("image/png", body(Vec::new())).await.unwrap_err();
        assert!(matches!(err, UploadStorageError::Rejected(ImageRejection::Empty)));
        assert!(walk(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn rejects_unsupported_type_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir, 1024);

        let err = storage
            .store_image("text/plain", body(vec![Ok(Bytes::from_static(b"hello"))]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UploadStorageError::Rejected(ImageRejection::UnsupportedType(_))
        ));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn rejects_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir, 1024);
        assert!(matches!(
            storage.read("../secret").await,
            Err(UploadStorageError::InvalidPath)
        ));
        assert!(matches!(
            storage.read("/etc/passwd").await,
            Err(UploadStorageError::InvalidPath)
        ));
    }

    fn walk(root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    files.push(path);
                }
            }
        }
        files
    }
}
