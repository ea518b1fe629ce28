use async_trait::async_trait;

use super::domain::{Listing, ListingDraft, ListingId};

/// Persistent record store boundary. The catalog surfaces these error
/// messages to the user verbatim, so implementations should keep them
/// human readable.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn query_all(&self) -> Result<Vec<Listing>, RecordStoreError>;

    /// Listings whose embedded agent email matches `email` ("my listings").
    async fn query_by_agent_email(&self, email: &str) -> Result<Vec<Listing>, RecordStoreError>;

    async fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, RecordStoreError>;

    /// Persists a draft; the store assigns the id and creation timestamp.
    async fn insert(&self, draft: ListingDraft) -> Result<Listing, RecordStoreError>;

    async fn update(&self, id: &ListingId, draft: ListingDraft) -> Result<(), RecordStoreError>;

    async fn delete(&self, id: &ListingId) -> Result<(), RecordStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("listing not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store rejected the request: {0}")]
    Rejected(String),
}

/// The single externally-persisted client record the catalog reads to
/// scope "my listings". Loaded once at catalog entry, cleared on
/// sign-out; only the email is interpreted, the token is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub email: String,
    pub token: String,
}

/// Injected session collaborator. The filter engine and upload pipeline
/// never touch this; only the catalog service reads it.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<SessionRecord>;
    fn set(&self, record: SessionRecord);
    fn clear(&self);
}
