use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

use super::domain::ListingId;
use super::filter::FilterForm;
use super::repository::{RecordStore, RecordStoreError};
use super::service::{CatalogError, CatalogService};
use super::submission::{ListingForm, ListingPatch};
use super::uploads::AssetFile;

/// Router builder exposing the catalog's HTTP endpoints.
pub fn catalog_router<R>(service: Arc<CatalogService<R>>) -> Router
where
    R: RecordStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/v1/listings/mine", get(my_listings_handler::<R>))
        .route(
            "/api/v1/listings/:id",
            put(update_handler::<R>).delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/listings/:id/favorite",
            post(favorite_handler::<R>),
        )
        .route("/api/v1/catalog/reload", post(reload_handler::<R>))
        .with_state(service)
}

/// One binary asset on the JSON API: payload is base64, content type a
/// plain mime string (defaults to octet-stream when absent or invalid).
#[derive(Debug, Deserialize)]
pub struct AssetUpload {
    pub file_name: String,
    #[serde(default)]
    pub content_type: String,
    pub data_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    #[serde(flatten)]
    pub form: ListingForm,
    #[serde(default)]
    pub assets: Vec<AssetUpload>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListingRequest {
    #[serde(flatten)]
    pub patch: ListingPatch,
    #[serde(default)]
    pub assets: Vec<AssetUpload>,
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(form): Query<FilterForm>,
) -> Response
where
    R: RecordStore + 'static,
{
    let criteria = form.criteria();
    let listings = service.visible(&criteria);
    let payload = json!({
        "total": service.catalog_size(),
        "count": listings.len(),
        "listings": listings,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn my_listings_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
) -> Response
where
    R: RecordStore + 'static,
{
    match service.my_listings().await {
        Ok(listings) => (StatusCode::OK, Json(json!({ "listings": listings }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Json(request): Json<CreateListingRequest>,
) -> Response
where
    R: RecordStore + 'static,
{
    let files = match decode_assets(request.assets) {
        Ok(files) => files,
        Err(message) => return bad_asset_response(message),
    };

    match service.create_listing(request.form, files).await {
        Ok(listing) => (StatusCode::CREATED, Json(listing)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateListingRequest>,
) -> Response
where
    R: RecordStore + 'static,
{
    let files = match decode_assets(request.assets) {
        Ok(files) => files,
        Err(message) => return bad_asset_response(message),
    };

    let id = ListingId(id);
    match service.edit_listing(&id, request.patch, files).await {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: RecordStore + 'static,
{
    let id = ListingId(id);
    match service.delete_listing(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn favorite_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: RecordStore + 'static,
{
    let id = ListingId(id);
    let marked = service.toggle_favorite(&id);
    (StatusCode::OK, Json(json!({ "id": id, "marked": marked }))).into_response()
}

pub(crate) async fn reload_handler<R>(State(service): State<Arc<CatalogService<R>>>) -> Response
where
    R: RecordStore + 'static,
{
    match service.load_catalog().await {
        Ok(count) => (StatusCode::OK, Json(json!({ "count": count }))).into_response(),
        Err(err) => error_response(err),
    }
}

fn decode_assets(assets: Vec<AssetUpload>) -> Result<Vec<AssetFile>, String> {
    assets
        .into_iter()
        .map(|asset| {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(asset.data_base64.as_bytes())
                .map_err(|err| format!("asset '{}' is not valid base64: {err}", asset.file_name))?;
            let content_type = asset
                .content_type
                .parse::<mime::Mime>()
                .unwrap_or(mime::APPLICATION_OCTET_STREAM);
            Ok(AssetFile {
                file_name: asset.file_name,
                content_type,
                bytes,
            })
        })
        .collect()
}

fn bad_asset_response(message: String) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// Error messages reach the client verbatim; only the status differs by
/// taxonomy.
fn error_response(err: CatalogError) -> Response {
    let status = match &err {
        CatalogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::Records(RecordStoreError::NotFound) => StatusCode::NOT_FOUND,
        CatalogError::Records(RecordStoreError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
        CatalogError::Records(RecordStoreError::Rejected(_)) => StatusCode::BAD_REQUEST,
        CatalogError::Retrieval(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
