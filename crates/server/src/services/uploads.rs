//! Design order intake: store submitted images, then record the order.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tracing::instrument;

use rolla_core::{DesignOrder, NewDesignOrder};

use crate::db::{DesignOrderRepository, RepositoryError};
use crate::storage::{ObjectStore, ObjectStoreError};

/// Largest accepted file part, in bytes.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Name under which a base64 front image is stored.
pub const FRONT_DESIGN_FILE_NAME: &str = "front_design.png";

/// Name under which a base64 back image is stored.
pub const BACK_DESIGN_FILE_NAME: &str = "back_design.png";

/// Upload failures.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File {name} exceeds the 5 MiB limit")]
    FileTooLarge { name: String, size: usize },

    #[error("Invalid image data URL: {0}")]
    InvalidDataUrl(&'static str),

    #[error(transparent)]
    Storage(#[from] ObjectStoreError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A decoded `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Parse a base64 data URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidDataUrl` if the scheme, the `;base64`
    /// marker, or the payload is malformed.
    pub fn parse(raw: &str) -> Result<Self, UploadError> {
        let rest = raw
            .strip_prefix("data:")
            .ok_or(UploadError::InvalidDataUrl("missing data: scheme"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or(UploadError::InvalidDataUrl("missing payload"))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(UploadError::InvalidDataUrl("payload is not base64"))?;
        // Drop parameters such as `;charset=...`
        let mime = mime.split(';').next().unwrap_or_default().trim();
        if mime.is_empty() {
            return Err(UploadError::InvalidDataUrl("missing media type"));
        }

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| UploadError::InvalidDataUrl("undecodable base64 payload"))?;

        Ok(Self {
            mime: mime.to_string(),
            bytes,
        })
    }
}

/// A file part from the upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Everything submitted to `POST /api/upload`.
#[derive(Debug, Clone, Default)]
pub struct DesignUpload {
    /// `images` file parts in form order.
    pub files: Vec<UploadedFile>,
    /// `frontImage` data URL.
    pub front_image: Option<String>,
    /// `backImage` data URL.
    pub back_image: Option<String>,
    pub text: Option<String>,
    pub text2: Option<String>,
}

/// Stores design images and records design orders.
#[derive(Clone)]
pub struct UploadService {
    store: Option<Arc<dyn ObjectStore>>,
    orders: Arc<dyn DesignOrderRepository>,
}

impl UploadService {
    #[must_use]
    pub fn new(
        store: Option<Arc<dyn ObjectStore>>,
        orders: Arc<dyn DesignOrderRepository>,
    ) -> Self {
        Self { store, orders }
    }

    /// Store the submitted images and persist a design order pointing at them.
    ///
    /// The first file becomes the front image and any later file the back
    /// image. Data URLs override the file-derived URLs. All input is checked
    /// before the first upload; uploads then run one at a time.
    ///
    /// # Errors
    ///
    /// Returns `FileTooLarge` or `InvalidDataUrl` for bad input, `Storage`
    /// if an upload fails or no store is configured, and `Repository` if the
    /// order cannot be saved.
    #[instrument(skip_all, fields(files = upload.files.len()))]
    pub async fn submit(&self, upload: DesignUpload) -> Result<DesignOrder, UploadError> {
        if let Some(file) = upload.files.iter().find(|f| f.bytes.len() > MAX_FILE_BYTES) {
            return Err(UploadError::FileTooLarge {
                name: file.file_name.clone(),
                size: file.bytes.len(),
            });
        }
        let front = non_empty(upload.front_image).map(|raw| DataUrl::parse(&raw)).transpose()?;
        let back = non_empty(upload.back_image).map(|raw| DataUrl::parse(&raw)).transpose()?;

        let mut draft = NewDesignOrder {
            text: upload.text.unwrap_or_default(),
            text2: upload.text2.unwrap_or_default(),
            ..NewDesignOrder::default()
        };

        for file in upload.files {
            let url = self
                .store()?
                .put(&file.file_name, file.bytes, &file.content_type)
                .await?;
            if draft.image_url.is_none() {
                draft.image_url = Some(url);
            } else {
                draft.image_url2 = Some(url);
            }
        }

        if let Some(image) = front {
            draft.image_url = Some(
                self.store()?
                    .put(FRONT_DESIGN_FILE_NAME, image.bytes, &image.mime)
                    .await?,
            );
        }
        if let Some(image) = back {
            draft.image_url2 = Some(
                self.store()?
                    .put(BACK_DESIGN_FILE_NAME, image.bytes, &image.mime)
                    .await?,
            );
        }

        let order = self.orders.create(draft).await?;
        tracing::info!(order_id = %order.id, "Design order stored");
        Ok(order)
    }

    fn store(&self) -> Result<&dyn ObjectStore, ObjectStoreError> {
        self.store.as_deref().ok_or(ObjectStoreError::NotConfigured)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::InMemoryDesignOrderRepository;
    use crate::storage::InMemoryObjectStore;

    // "hello" in base64
    const HELLO_PNG: &str = "data:image/png;base64,aGVsbG8=";

    fn file(name: &str, len: usize) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xAB; len],
        }
    }

    fn service() -> (UploadService, InMemoryObjectStore, InMemoryDesignOrderRepository) {
        let store = InMemoryObjectStore::new();
        let orders = InMemoryDesignOrderRepository::new();
        let service = UploadService::new(Some(Arc::new(store.clone())), Arc::new(orders.clone()));
        (service, store, orders)
    }

    #[test]
    fn test_parse_data_url() {
        let parsed = DataUrl::parse(HELLO_PNG).unwrap();
        assert_eq!(parsed.mime, "image/png");
        assert_eq!(parsed.bytes, b"hello");
    }

    #[test]
    fn test_parse_data_url_with_parameters() {
        let parsed = DataUrl::parse("data:image/svg+xml;charset=utf-8;base64,aGVsbG8=").unwrap();
        assert_eq!(parsed.mime, "image/svg+xml");
    }

    #[test]
    fn test_parse_data_url_rejects_malformed() {
        for raw in [
            "aGVsbG8=",
            "data:image/png;base64",
            "data:image/png,aGVsbG8=",
            "data:;base64,aGVsbG8=",
            "data:image/png;base64,@@not-base64@@",
        ] {
            assert!(
                matches!(DataUrl::parse(raw), Err(UploadError::InvalidDataUrl(_))),
                "accepted {raw}"
            );
        }
    }

    #[tokio::test]
    async fn test_files_fill_front_then_back() {
        let (service, store, _) = service();
        let order = service
            .submit(DesignUpload {
                files: vec![file("front.jpg", 10), file("back.jpg", 10)],
                ..DesignUpload::default()
            })
            .await
            .unwrap();

        let objects = store.objects().await;
        assert_eq!(objects.len(), 2);
        assert!(objects[0].key.ends_with("-front.jpg"));
        assert!(order.image_url.as_deref().unwrap().ends_with("-front.jpg"));
        assert!(order.image_url2.as_deref().unwrap().ends_with("-back.jpg"));
    }

    #[tokio::test]
    async fn test_data_urls_override_files() {
        let (service, store, _) = service();
        let order = service
            .submit(DesignUpload {
                files: vec![file("front.jpg", 10)],
                front_image: Some(HELLO_PNG.to_string()),
                back_image: Some(HELLO_PNG.to_string()),
                ..DesignUpload::default()
            })
            .await
            .unwrap();

        assert!(
            order
                .image_url
                .as_deref()
                .unwrap()
                .ends_with(&format!("-{FRONT_DESIGN_FILE_NAME}"))
        );
        assert!(
            order
                .image_url2
                .as_deref()
                .unwrap()
                .ends_with(&format!("-{BACK_DESIGN_FILE_NAME}"))
        );
        let objects = store.objects().await;
        assert_eq!(objects.len(), 3);
        assert_eq!(objects[1].content_type, "image/png");
        assert_eq!(objects[1].bytes, b"hello");
    }

    #[tokio::test]
    async fn test_text_only_order_defaults() {
        let (service, store, orders) = service();
        let order = service.submit(DesignUpload::default()).await.unwrap();

        assert_eq!(order.image_url, None);
        assert_eq!(order.image_url2, None);
        assert_eq!(order.text, "");
        assert_eq!(order.text2, "");
        assert!(store.objects().await.is_empty());
        assert_eq!(orders.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_data_url_is_ignored() {
        let (service, store, _) = service();
        let order = service
            .submit(DesignUpload {
                front_image: Some(String::new()),
                text: Some("Rolla".to_string()),
                ..DesignUpload::default()
            })
            .await
            .unwrap();

        assert_eq!(order.image_url, None);
        assert_eq!(order.text, "Rolla");
        assert!(store.objects().await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_before_upload() {
        let (service, store, orders) = service();
        let err = service
            .submit(DesignUpload {
                files: vec![file("ok.jpg", 10), file("big.jpg", MAX_FILE_BYTES + 1)],
                ..DesignUpload::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::FileTooLarge { ref name, .. } if name == "big.jpg"));
        assert!(store.objects().await.is_empty());
        assert!(orders.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_data_url_rejected_before_upload() {
        let (service, store, _) = service();
        let err = service
            .submit(DesignUpload {
                files: vec![file("front.jpg", 10)],
                back_image: Some("not a data url".to_string()),
                ..DesignUpload::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::InvalidDataUrl(_)));
        assert!(store.objects().await.is_empty());
    }

    #[tokio::test]
    async fn test_images_without_store_fail() {
        let orders = InMemoryDesignOrderRepository::new();
        let service = UploadService::new(None, Arc::new(orders.clone()));

        let err = service
            .submit(DesignUpload {
                files: vec![file("front.jpg", 10)],
                ..DesignUpload::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploadError::Storage(ObjectStoreError::NotConfigured)
        ));
        assert!(orders.all().await.is_empty());
    }
}
