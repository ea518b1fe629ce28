use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use realty_catalog::catalog::{
    Listing, ListingDraft, ListingId, ObjectStorage, RecordStore, RecordStoreError, SessionRecord,
    SessionStore, StorageError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Self-contained record store so the service can run (and be demoed)
/// without the managed backend. Assigns ids and creation timestamps the
/// way the external store would.
#[derive(Default)]
pub(crate) struct InMemoryRecordStore {
    rows: Mutex<Vec<Listing>>,
    sequence: AtomicU64,
}

impl InMemoryRecordStore {
    pub(crate) fn seed(&self, drafts: Vec<ListingDraft>) {
        let mut rows = self.rows.lock().expect("record store mutex poisoned");
        for draft in drafts {
            let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            rows.push(Listing {
                id: ListingId(format!("lst-{id:06}")),
                created_at: Some(Utc::now()),
                draft,
            });
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn query_all(&self) -> Result<Vec<Listing>, RecordStoreError> {
        Ok(self
            .rows
            .lock()
            .expect("record store mutex poisoned")
            .clone())
    }

    async fn query_by_agent_email(&self, email: &str) -> Result<Vec<Listing>, RecordStoreError> {
        Ok(self
            .rows
            .lock()
            .expect("record store mutex poisoned")
            .iter()
            .filter(|listing| listing.draft.agent.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect())
    }

    async fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, RecordStoreError> {
        Ok(self
            .rows
            .lock()
            .expect("record store mutex poisoned")
            .iter()
            .find(|listing| &listing.id == id)
            .cloned())
    }

    async fn insert(&self, draft: ListingDraft) -> Result<Listing, RecordStoreError> {
        let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let listing = Listing {
            id: ListingId(format!("lst-{id:06}")),
            created_at: Some(Utc::now()),
            draft,
        };
        self.rows
            .lock()
            .expect("record store mutex poisoned")
            .push(listing.clone());
        Ok(listing)
    }

    async fn update(&self, id: &ListingId, draft: ListingDraft) -> Result<(), RecordStoreError> {
        let mut rows = self.rows.lock().expect("record store mutex poisoned");
        let row = rows
            .iter_mut()
            .find(|listing| &listing.id == id)
            .ok_or(RecordStoreError::NotFound)?;
        row.draft = draft;
        Ok(())
    }

    async fn delete(&self, id: &ListingId) -> Result<(), RecordStoreError> {
        let mut rows = self.rows.lock().expect("record store mutex poisoned");
        let before = rows.len();
        rows.retain(|listing| &listing.id != id);
        if rows.len() == before {
            return Err(RecordStoreError::NotFound);
        }
        Ok(())
    }
}

/// Bucket stand-in: keeps object sizes keyed by path and mints
/// deterministic public URLs. Keys containing "broken" fail, which the
/// demo uses to show partial-failure tolerance.
#[derive(Default)]
pub(crate) struct InMemoryObjectStorage {
    objects: Mutex<HashMap<String, usize>>,
}

impl InMemoryObjectStorage {
    pub(crate) fn object_count(&self) -> usize {
        self.objects.lock().expect("storage mutex poisoned").len()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put_object(
        &self,
        _bucket: &str,
        key: &str,
        _content_type: &mime::Mime,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        if key.contains("broken") {
            return Err(StorageError::Backend("simulated upload failure".to_string()));
        }
        self.objects
            .lock()
            .expect("storage mutex poisoned")
            .insert(key.to_string(), bytes.len());
        Ok(())
    }

    async fn public_url(&self, bucket: &str, key: &str) -> Result<String, StorageError> {
        Ok(format!("https://storage.local/{bucket}/{key}"))
    }
}

/// Session collaborator backed by process memory, optionally seeded from
/// APP_SESSION_EMAIL so "my listings" has something to scope against.
#[derive(Default)]
pub(crate) struct LocalSessionStore {
    record: Mutex<Option<SessionRecord>>,
}

impl LocalSessionStore {
    pub(crate) fn from_env() -> Self {
        let record = std::env::var("APP_SESSION_EMAIL").ok().map(|email| SessionRecord {
            email,
            token: "local-session".to_string(),
        });
        Self {
            record: Mutex::new(record),
        }
    }
}

impl SessionStore for LocalSessionStore {
    fn get(&self) -> Option<SessionRecord> {
        self.record.lock().expect("session mutex poisoned").clone()
    }

    fn set(&self, record: SessionRecord) {
        *self.record.lock().expect("session mutex poisoned") = Some(record);
    }

    fn clear(&self) {
        *self.record.lock().expect("session mutex poisoned") = None;
    }
}
