use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, DATABASE_ERROR};
use crate::extract::{QueryParams, RawBody};
use crate::response;
use crate::state::AppState;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use stockroom_core::prelude::*;
use tracing::{info, warn};
use uuid::Uuid;

const CREATE_FAILED: &str = "Failed to create asset";
const ATTACH_FAILED: &str = "Failed to attach image";

#[derive(Serialize)]
pub struct AssetList {
    pub assets: Vec<Asset>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct RecordList {
    pub records: Vec<AuxiliaryRecord>,
}

/// Fetches `raw_id` and applies the ownership rule: 404 before 403.
async fn load_owned<R: AssetRepository>(
    assets: &R,
    principal: &Principal,
    raw_id: &str,
) -> Result<Asset, AssetError> {
    let id = parse_asset_id(raw_id)?;
    let asset = assets
        .get(id)
        .await
        .map_err(AssetError::persistence(DATABASE_ERROR))?;
    owned(principal, asset)
}

async fn discard_blob<B: BlobStorage>(blobs: &B, principal: &Principal, key: &str) {
    if let Err(e) = blobs.delete_blob(&principal.id, key).await {
        warn!("Failed to delete blob {key}: {e}");
    }
}

/// POST /assets
pub async fn create_asset<R, B, X, A>(
    State(state): State<AppState<R, B, X, A>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    RawBody(body): RawBody,
) -> Result<Response, ApiError>
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    let body = json_object(&body)?;
    let input = NewAsset::from_json(&body)?;
    if input.owner_id != principal.id {
        return Err(AssetError::Forbidden.into());
    }

    let asset = state
        .assets
        .insert(input.into_draft(Uuid::new_v4()))
        .await
        .map_err(AssetError::persistence(CREATE_FAILED))?;

    info!(asset_id = %asset.id, owner_id = %asset.owner_id, "Asset created");
    Ok(response::success(asset, StatusCode::CREATED))
}

/// GET /assets/{id}
pub async fn get_asset<R, B, X, A>(
    State(state): State<AppState<R, B, X, A>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError>
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    let id = parse_asset_id(&id)?;
    let asset = state
        .assets
        .get(id)
        .await
        .map_err(AssetError::persistence(DATABASE_ERROR))?
        .ok_or(AssetError::NotFound)?;
    ensure_readable(&principal, &asset, state.read_policy)?;

    Ok(response::success(asset, StatusCode::OK))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// GET /assets
pub async fn list_assets<R, B, X, A>(
    State(state): State<AppState<R, B, X, A>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    query: QueryParams,
) -> Result<Response, ApiError>
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    // Nothing in the query can fail the request.
    let page = PageRequest::parse(query.get("limit"), query.get("offset"));
    let mut filter = AssetFilter::owned_by(principal.id.as_str());
    filter.category = non_blank(query.get("category")).map(str::to_lowercase);

    // The principal filter is mandatory; another owner id can only narrow it to nothing.
    let result = match non_blank(query.get("ownerId")) {
        Some(owner) if owner != principal.id => AssetPage::default(),
        _ => state
            .assets
            .list(&filter, page.limit, page.offset)
            .await
            .map_err(AssetError::persistence(DATABASE_ERROR))?,
    };

    let pagination = Pagination::new(result.total, page.limit, page.offset);
    Ok(response::success(
        AssetList {
            assets: result.assets,
            pagination,
        },
        StatusCode::OK,
    ))
}

/// PATCH /assets/{id}
pub async fn update_asset<R, B, X, A>(
    State(state): State<AppState<R, B, X, A>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<String>,
    RawBody(body): RawBody,
) -> Result<Response, ApiError>
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    // Existence and ownership come before the body, so strangers only ever see 404 or 403.
    let asset = load_owned(&state.assets, &principal, &id).await?;
    let body = json_object(&body)?;
    let changes = parse_changes(&body, &asset.owner_id)?;

    let updated = state
        .assets
        .update(asset.id, changes)
        .await
        .map_err(AssetError::persistence(DATABASE_ERROR))?
        .ok_or(AssetError::NotFound)?;

    info!(asset_id = %updated.id, "Asset updated");
    Ok(response::success(updated, StatusCode::OK))
}

/// DELETE /assets/{id}
pub async fn delete_asset<R, B, X, A>(
    State(state): State<AppState<R, B, X, A>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError>
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    let asset = load_owned(&state.assets, &principal, &id).await?;
    let removed = state
        .assets
        .delete(asset.id)
        .await
        .map_err(AssetError::persistence(DATABASE_ERROR))?;
    if !removed {
        return Err(AssetError::NotFound.into());
    }
    info!(asset_id = %asset.id, owner_id = %asset.owner_id, "Asset deleted");

    // Cascade is best effort; the asset is already gone.
    match state.records.purge(asset.id).await {
        Ok(0) => {}
        Ok(count) => info!(asset_id = %asset.id, "Purged {count} auxiliary records"),
        Err(e) => warn!(asset_id = %asset.id, "Failed to purge auxiliary records: {e}"),
    }
    if let Some(key) = &asset.image_key {
        discard_blob(&state.blobs, &principal, key).await;
    }

    Ok(response::no_content())
}

/// POST /assets/{id}/image?filename=...
///
/// Stores the blob, then records its key on the asset. The two steps are not a
/// transaction: if the second fails the blob is removed again and the asset is left
/// as it was.
pub async fn upload_image<R, B, X, A>(
    State(state): State<AppState<R, B, X, A>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<String>,
    query: QueryParams,
    RawBody(body): RawBody,
) -> Result<Response, ApiError>
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    let asset = load_owned(&state.assets, &principal, &id).await?;
    let filename = parse_filename(query.get("filename"))?;
    if body.is_empty() {
        return Err(ValidationError::new("Image body must not be empty").into());
    }

    let key = state.blobs.blob_key(&principal.id, asset.id, &filename);
    state.blobs.write_blob(&principal.id, &key, body).await?;

    match state
        .assets
        .update(asset.id, AssetChanges::image_key(key.as_str()))
        .await
    {
        Ok(Some(updated)) => {
            if let Some(previous) = asset.image_key.as_deref().filter(|p| *p != key) {
                discard_blob(&state.blobs, &principal, previous).await;
            }
            info!(asset_id = %updated.id, image_key = %key, "Image attached");
            Ok(response::success(updated, StatusCode::OK))
        }
        Ok(None) => {
            discard_blob(&state.blobs, &principal, &key).await;
            Err(AssetError::NotFound.into())
        }
        Err(source) => {
            discard_blob(&state.blobs, &principal, &key).await;
            Err(AssetError::Persistence {
                context: ATTACH_FAILED,
                source,
            }
            .into())
        }
    }
}

/// GET /assets/{id}/image
pub async fn download_image<R, B, X, A>(
    State(state): State<AppState<R, B, X, A>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError>
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    let id = parse_asset_id(&id)?;
    let asset = state
        .assets
        .get(id)
        .await
        .map_err(AssetError::persistence(DATABASE_ERROR))?
        .ok_or(AssetError::NotFound)?;
    ensure_readable(&principal, &asset, state.read_policy)?;

    let key = asset
        .image_key
        .ok_or_else(|| StorageError::NotFound(asset.id.to_string()))?;
    // The storage collaborator enforces the principal prefix.
    let data = state.blobs.read_blob(&principal.id, &key).await?;
    let content_type = mime_guess::from_path(&key).first_or_octet_stream();

    Ok(response::blob(data, content_type.essence_str()))
}

/// POST /assets/{id}/records
pub async fn create_record<R, B, X, A>(
    State(state): State<AppState<R, B, X, A>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<String>,
    RawBody(body): RawBody,
) -> Result<Response, ApiError>
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    let asset = load_owned(&state.assets, &principal, &id).await?;
    let body = json_object(&body)?;
    let input = NewRecord::from_json(&body)?;

    let record = state
        .records
        .append(asset.id, input.kind, input.data)
        .await?;

    info!(asset_id = %asset.id, kind = record.kind.as_str(), "Record added");
    Ok(response::success(record, StatusCode::CREATED))
}

/// GET /assets/{id}/records?kind=...
pub async fn list_records<R, B, X, A>(
    State(state): State<AppState<R, B, X, A>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<String>,
    query: QueryParams,
) -> Result<Response, ApiError>
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    let asset = load_owned(&state.assets, &principal, &id).await?;
    let kind = match non_blank(query.get("kind")) {
        None => None,
        Some(raw) => Some(RecordKind::from_name(&raw.to_lowercase()).ok_or_else(|| {
            ValidationError::for_field(
                "kind",
                format!("kind must be one of: {}", RecordKind::NAMES.join(", ")),
            )
        })?),
    };

    let records = state.records.list(asset.id, kind).await?;

    Ok(response::success(RecordList { records }, StatusCode::OK))
}
