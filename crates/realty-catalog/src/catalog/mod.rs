pub mod domain;
pub mod filter;
pub mod repository;
pub mod router;
pub mod selection;
pub mod service;
pub mod store;
pub mod submission;
pub mod uploads;

pub use domain::{Agent, Listing, ListingDraft, ListingId, ListingStatus, PropertyType};
pub use filter::{filter_listings, FilterCriteria, FilterForm};
pub use repository::{RecordStore, RecordStoreError, SessionRecord, SessionStore};
pub use router::catalog_router;
pub use selection::SelectionTracker;
pub use service::{CatalogError, CatalogService};
pub use store::ListingStore;
pub use submission::{assemble, merge, ListingForm, ListingPatch, ValidationError};
pub use uploads::{AssetFile, ObjectStorage, StorageError, StoredAsset, UploadPipeline};
