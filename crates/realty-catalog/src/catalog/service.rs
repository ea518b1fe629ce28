use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use super::domain::{Listing, ListingId};
use super::filter::{filter_listings, FilterCriteria};
use super::repository::{RecordStore, RecordStoreError, SessionStore};
use super::selection::SelectionTracker;
use super::store::ListingStore;
use super::submission::{assemble, merge, ListingForm, ListingPatch, ValidationError};
use super::uploads::{AssetFile, UploadPipeline};

/// Composes the listing store, filter engine, selection tracker, upload
/// pipeline, and the external collaborators. The store is only mutated
/// after the record store confirms the matching operation.
pub struct CatalogService<R> {
    records: Arc<R>,
    session: Arc<dyn SessionStore>,
    pipeline: UploadPipeline,
    store: Mutex<ListingStore>,
    favorites: Mutex<SelectionTracker>,
}

impl<R> CatalogService<R>
where
    R: RecordStore + 'static,
{
    pub fn new(records: Arc<R>, session: Arc<dyn SessionStore>, pipeline: UploadPipeline) -> Self {
        Self {
            records,
            session,
            pipeline,
            store: Mutex::new(ListingStore::new()),
            favorites: Mutex::new(SelectionTracker::new()),
        }
    }

    /// Fetches the full catalog into the in-memory store. A failed fetch
    /// leaves an empty catalog behind and surfaces a retrievable error
    /// state; callers present it as a dismissible notice, not a crash.
    pub async fn load_catalog(&self) -> Result<usize, CatalogError> {
        match self.records.query_all().await {
            Ok(listings) => {
                let count = listings.len();
                self.store
                    .lock()
                    .expect("listing store mutex poisoned")
                    .replace_all(listings);
                info!(count, "catalog loaded");
                Ok(count)
            }
            Err(err) => {
                self.store
                    .lock()
                    .expect("listing store mutex poisoned")
                    .replace_all(Vec::new());
                warn!(error = %err, "catalog fetch failed; presenting empty catalog");
                Err(CatalogError::Retrieval(err.to_string()))
            }
        }
    }

    /// Snapshot of the store filtered by `criteria`, in store order.
    pub fn visible(&self, criteria: &FilterCriteria) -> Vec<Listing> {
        let store = self.store.lock().expect("listing store mutex poisoned");
        filter_listings(store.all(), criteria)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn catalog_size(&self) -> usize {
        self.store
            .lock()
            .expect("listing store mutex poisoned")
            .len()
    }

    pub fn get(&self, id: &ListingId) -> Option<Listing> {
        self.store
            .lock()
            .expect("listing store mutex poisoned")
            .get(id)
            .cloned()
    }

    /// Flips the favorite mark for `id`; the id need not be visible or
    /// even loaded. Returns true when now marked.
    pub fn toggle_favorite(&self, id: &ListingId) -> bool {
        self.favorites
            .lock()
            .expect("favorites mutex poisoned")
            .toggle(id)
    }

    pub fn favorites(&self) -> Vec<ListingId> {
        self.favorites
            .lock()
            .expect("favorites mutex poisoned")
            .marked()
    }

    /// Uploads the asset batch (best effort), assembles the draft, and
    /// persists it. The listing only lands in the local store once the
    /// record store confirms the insert.
    pub async fn create_listing(
        &self,
        form: ListingForm,
        files: Vec<AssetFile>,
    ) -> Result<Listing, CatalogError> {
        let uploads = self.pipeline.upload_all(files).await;
        let draft = assemble(&form, &uploads)?;
        let listing = self.records.insert(draft).await?;

        self.store
            .lock()
            .expect("listing store mutex poisoned")
            .add(listing.clone());
        info!(id = %listing.id, "listing created");
        Ok(listing)
    }

    /// Re-validates the supplied fields over the stored record and
    /// persists the merged draft. A non-empty `files` batch replaces the
    /// image sequence.
    pub async fn edit_listing(
        &self,
        id: &ListingId,
        patch: ListingPatch,
        files: Vec<AssetFile>,
    ) -> Result<Listing, CatalogError> {
        let existing = self
            .records
            .fetch(id)
            .await?
            .ok_or(RecordStoreError::NotFound)?;

        let uploads = if files.is_empty() {
            None
        } else {
            Some(self.pipeline.upload_all(files).await)
        };
        let draft = merge(&existing, &patch, uploads.as_deref())?;

        self.records.update(id, draft.clone()).await?;

        let updated = Listing {
            id: id.clone(),
            created_at: existing.created_at,
            draft,
        };
        self.store
            .lock()
            .expect("listing store mutex poisoned")
            .replace(updated.clone());
        info!(id = %id, "listing updated");
        Ok(updated)
    }

    /// Deletes from the record store first; the local row is removed only
    /// after the external delete succeeds.
    pub async fn delete_listing(&self, id: &ListingId) -> Result<(), CatalogError> {
        self.records.delete(id).await?;
        self.store
            .lock()
            .expect("listing store mutex poisoned")
            .remove(id);
        info!(id = %id, "listing deleted");
        Ok(())
    }

    /// Listings scoped to the signed-in agent. No session record means
    /// nothing to scope: an empty list, not an error.
    pub async fn my_listings(&self) -> Result<Vec<Listing>, CatalogError> {
        let Some(session) = self.session.get() else {
            return Ok(Vec::new());
        };
        let listings = self.records.query_by_agent_email(&session.email).await?;
        Ok(listings)
    }

    pub fn sign_out(&self) {
        self.session.clear();
    }
}

/// Failure taxonomy for catalog operations. Validation and persistence
/// failures abort the operation with no partial state change; retrieval
/// failures degrade to an empty catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog could not be loaded: {0}")]
    Retrieval(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Records(#[from] RecordStoreError),
}
