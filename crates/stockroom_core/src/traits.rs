use crate::asset::*;
use crate::error::*;
use crate::records::{AuxiliaryRecord, RecordKind};

use bytes::Bytes;
use serde_json::Value;

/// Persistence collaborator for [`Asset`] rows.
///
/// The hosting boundary owns the lifecycle. Handlers never open or close a repository
/// and must behave the same whether the underlying connection is fresh or reused.
/// Every method is a single atomic operation on a single row (or a single read for
/// [`AssetRepository::list`]).
pub trait AssetRepository: Send + Sync + 'static + Clone {
    fn open(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
    fn close(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
    fn is_open(&self) -> bool;

    /// Inserts a new row, assigning `created_at` and `updated_at`.
    /// An existing id is a [`RepositoryError::Conflict`].
    fn insert(
        &self,
        draft: AssetDraft,
    ) -> impl Future<Output = Result<Asset, RepositoryError>> + Send;

    fn get(
        &self,
        id: AssetId,
    ) -> impl Future<Output = Result<Option<Asset>, RepositoryError>> + Send;

    /// Matching rows ordered by `created_at` descending, with the total match count.
    fn list(
        &self,
        filter: &AssetFilter,
        limit: u64,
        offset: u64,
    ) -> impl Future<Output = Result<AssetPage, RepositoryError>> + Send;

    /// Applies `changes` and bumps `updated_at`. `None` if the row does not exist.
    fn update(
        &self,
        id: AssetId,
        changes: AssetChanges,
    ) -> impl Future<Output = Result<Option<Asset>, RepositoryError>> + Send;

    /// Hard delete. Returns whether a row was removed.
    fn delete(&self, id: AssetId) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Object storage for asset images.
///
/// Keys follow `{principal}/{asset id}/{filename}`. Implementations must refuse any
/// key outside the caller's prefix, see [`authorize_key`].
pub trait BlobStorage: Send + Sync + 'static + Clone {
    fn write_blob(
        &self,
        principal: &str,
        key: &str,
        data: Bytes,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn read_blob(
        &self,
        principal: &str,
        key: &str,
    ) -> impl Future<Output = Result<Bytes, StorageError>> + Send;

    /// Deleting a missing blob is not an error.
    fn delete_blob(
        &self,
        principal: &str,
        key: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn blob_key(&self, principal: &str, asset_id: AssetId, filename: &str) -> String {
        format!("{principal}/{asset_id}/{filename}")
    }
}

/// Rejects keys that do not sit below `{principal}/` or that try to escape it.
pub fn authorize_key(principal: &str, key: &str) -> Result<(), StorageError> {
    let escapes = key.starts_with('/') || key.split(['/', '\\']).any(|s| s == "..");
    let inside = !principal.is_empty()
        && key
            .strip_prefix(principal)
            .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1);
    if escapes || !inside {
        return Err(StorageError::Forbidden(key.to_string()));
    }
    Ok(())
}

/// Collaborator for tags, status entries and activity entries.
///
/// Callers must pass the id of an asset whose ownership they have already verified.
pub trait RecordStore: Send + Sync + 'static + Clone {
    fn append(
        &self,
        asset_id: AssetId,
        kind: RecordKind,
        data: Value,
    ) -> impl Future<Output = Result<AuxiliaryRecord, RecordError>> + Send;

    /// Oldest first.
    fn list(
        &self,
        asset_id: AssetId,
        kind: Option<RecordKind>,
    ) -> impl Future<Output = Result<Vec<AuxiliaryRecord>, RecordError>> + Send;

    /// Removes every record of the asset and returns how many there were.
    fn purge(&self, asset_id: AssetId) -> impl Future<Output = Result<u64, RecordError>> + Send;
}

/// The authenticated identity making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Identity collaborator: turns a credential into a [`Principal`].
pub trait AuthProvider: Send + Sync + 'static + Clone {
    fn verify(&self, token: &str) -> impl Future<Output = Result<Principal, AuthError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_inside_the_prefix_are_allowed() {
        assert!(authorize_key("u1", "u1/abc/photo.png").is_ok());
    }

    #[test]
    fn foreign_and_escaping_keys_are_forbidden() {
        for key in [
            "u2/abc/photo.png",
            "u10/abc/photo.png",
            "/u1/abc/photo.png",
            "u1/../u2/photo.png",
            "u1/",
            "u1",
        ] {
            assert!(
                matches!(authorize_key("u1", key), Err(StorageError::Forbidden(_))),
                "{key}"
            );
        }
        assert!(authorize_key("", "/x").is_err());
    }
}
