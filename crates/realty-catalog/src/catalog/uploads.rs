use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::warn;
use uuid::Uuid;

use crate::config::StorageConfig;

/// One binary asset chosen for a submission.
#[derive(Debug, Clone)]
pub struct AssetFile {
    pub file_name: String,
    pub content_type: mime::Mime,
    pub bytes: Vec<u8>,
}

/// A successfully stored asset: the original name plus its public
/// reference. Failed files are omitted from results, never placeheld.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub source_file_name: String,
    pub public_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("no public url resolvable for key '{0}'")]
    UnresolvedReference(String),
}

/// Object storage boundary. Implementations wrap whatever bucket service
/// the deployment uses; tests provide in-memory fakes.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &mime::Mime,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError>;

    async fn public_url(&self, bucket: &str, key: &str) -> Result<String, StorageError>;
}

/// Best-effort batch uploader. Each file is attempted once under a
/// collision-resistant key; a failed upload (or a success whose public
/// reference cannot be resolved) is logged and skipped without aborting
/// the batch. Output order always mirrors input order.
pub struct UploadPipeline {
    storage: Arc<dyn ObjectStorage>,
    bucket: String,
    concurrency: usize,
}

impl UploadPipeline {
    pub fn new(storage: Arc<dyn ObjectStorage>, config: &StorageConfig) -> Self {
        Self {
            storage,
            bucket: config.bucket.clone(),
            concurrency: config.upload_concurrency.max(1),
        }
    }

    /// Uploads the batch with bounded parallelism. Completions arrive out
    /// of order and are re-sorted by input index, so the ordering
    /// guarantee does not depend on serializing requests. An empty batch
    /// returns empty without contacting storage. Dropping the returned
    /// future cancels any in-flight requests.
    pub async fn upload_all(&self, files: Vec<AssetFile>) -> Vec<StoredAsset> {
        if files.is_empty() {
            return Vec::new();
        }

        let mut completed: Vec<(usize, Option<StoredAsset>)> = stream::iter(
            files
                .into_iter()
                .enumerate()
                .map(|(idx, file)| async move { (idx, self.upload_one(file).await) }),
        )
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        completed.sort_by_key(|(idx, _)| *idx);
        completed
            .into_iter()
            .filter_map(|(_, asset)| asset)
            .collect()
    }

    async fn upload_one(&self, file: AssetFile) -> Option<StoredAsset> {
        // Random prefix avoids key collisions while keeping the original
        // name readable in the bucket.
        let key = format!("property-images/{}-{}", Uuid::new_v4(), file.file_name);
        let AssetFile {
            file_name,
            content_type,
            bytes,
        } = file;

        if let Err(err) = self
            .storage
            .put_object(&self.bucket, &key, &content_type, bytes)
            .await
        {
            warn!(file = %file_name, error = %err, "skipping asset after failed upload");
            return None;
        }

        match self.storage.public_url(&self.bucket, &key).await {
            Ok(public_url) => Some(StoredAsset {
                source_file_name: file_name,
                public_url,
            }),
            Err(err) => {
                warn!(file = %file_name, error = %err, "skipping stored asset with no public url");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn png() -> mime::Mime {
        mime::IMAGE_PNG
    }

    /// Fake bucket that fails uploads for file names carrying "bad" and
    /// counts every storage call.
    #[derive(Default)]
    struct FlakyStorage {
        calls: AtomicUsize,
        objects: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStorage for FlakyStorage {
        async fn put_object(
            &self,
            _bucket: &str,
            key: &str,
            _content_type: &mime::Mime,
            _bytes: Vec<u8>,
        ) -> Result<(), StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if key.contains("bad") {
                return Err(StorageError::Backend("disk full".to_string()));
            }
            self.objects
                .lock()
                .expect("objects mutex poisoned")
                .push(key.to_string());
            Ok(())
        }

        async fn public_url(&self, bucket: &str, key: &str) -> Result<String, StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("https://storage.local/{bucket}/{key}"))
        }
    }

    fn pipeline(storage: Arc<dyn ObjectStorage>, concurrency: usize) -> UploadPipeline {
        UploadPipeline::new(
            storage,
            &StorageConfig {
                bucket: "listing-storage".to_string(),
                upload_concurrency: concurrency,
            },
        )
    }

    fn file(name: &str) -> AssetFile {
        AssetFile {
            file_name: name.to_string(),
            content_type: png(),
            bytes: vec![0u8; 16],
        }
    }

    #[tokio::test]
    async fn empty_batch_never_contacts_storage() {
        let storage = Arc::new(FlakyStorage::default());
        let uploaded = pipeline(storage.clone(), 4).upload_all(Vec::new()).await;
        assert!(uploaded.is_empty());
        assert_eq!(storage.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_file_is_skipped_and_order_is_preserved() {
        let storage = Arc::new(FlakyStorage::default());
        let uploaded = pipeline(storage, 4)
            .upload_all(vec![file("front.jpg"), file("bad-kitchen.jpg"), file("yard.jpg")])
            .await;

        let names: Vec<&str> = uploaded
            .iter()
            .map(|asset| asset.source_file_name.as_str())
            .collect();
        assert_eq!(names, vec!["front.jpg", "yard.jpg"]);
    }

    #[tokio::test]
    async fn output_mirrors_input_order_under_concurrency() {
        let storage = Arc::new(FlakyStorage::default());
        let files: Vec<AssetFile> = (0..12).map(|i| file(&format!("photo-{i:02}.jpg"))).collect();
        let expected: Vec<String> = files.iter().map(|f| f.file_name.clone()).collect();

        let uploaded = pipeline(storage, 5).upload_all(files).await;
        let names: Vec<String> = uploaded
            .into_iter()
            .map(|asset| asset.source_file_name)
            .collect();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn unresolvable_reference_counts_as_failure() {
        struct NoUrlStorage;

        #[async_trait]
        impl ObjectStorage for NoUrlStorage {
            async fn put_object(
                &self,
                _bucket: &str,
                _key: &str,
                _content_type: &mime::Mime,
                _bytes: Vec<u8>,
            ) -> Result<(), StorageError> {
                Ok(())
            }

            async fn public_url(&self, _bucket: &str, key: &str) -> Result<String, StorageError> {
                Err(StorageError::UnresolvedReference(key.to_string()))
            }
        }

        let uploaded = pipeline(Arc::new(NoUrlStorage), 2)
            .upload_all(vec![file("front.jpg")])
            .await;
        assert!(uploaded.is_empty());
    }

    #[tokio::test]
    async fn keys_are_collision_resistant_but_keep_the_name() {
        let storage = Arc::new(FlakyStorage::default());
        pipeline(storage.clone(), 1)
            .upload_all(vec![file("front.jpg"), file("front.jpg")])
            .await;

        let objects = storage.objects.lock().expect("objects mutex poisoned");
        assert_eq!(objects.len(), 2);
        assert_ne!(objects[0], objects[1]);
        assert!(objects.iter().all(|key| {
            key.starts_with("property-images/") && key.ends_with("-front.jpg")
        }));
    }
}
