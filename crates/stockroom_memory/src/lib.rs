//! # Stockroom In-Memory Backends
//!
//! Process-local implementations of the stockroom collaborator traits, for tests,
//! demos and single-node deployments that do not need durability.
//!
//! * [`InMemoryAssetRepository`]: [`AssetRepository`] with an explicit
//!   `open`/`close` lifecycle. Operations on a closed repository fail with
//!   [`RepositoryError::Closed`].
//! * [`InMemoryRecordStore`]: [`RecordStore`] for tags, status and activity entries.
//! * [`InMemoryBlobStorage`]: [`BlobStorage`] enforcing principal-scoped keys.
//!
//! ## Usage
//!
//! ```no_run
//! use stockroom_core::prelude::*;
//! use stockroom_memory::InMemoryAssetRepository;
//!
//! # async fn run() -> Result<(), RepositoryError> {
//! let repo = InMemoryAssetRepository::new();
//! repo.open().await?;
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use stockroom_core::prelude::*;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Row {
    asset: Asset,
    /// Insertion order, breaks `created_at` ties.
    seq: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryAssetRepository {
    rows: Arc<RwLock<HashMap<AssetId, Row>>>,
    open: Arc<AtomicBool>,
    seq: Arc<AtomicU64>,
}

impl InMemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), RepositoryError> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(RepositoryError::Closed)
        }
    }
}

impl AssetRepository for InMemoryAssetRepository {
    async fn open(&self) -> Result<(), RepositoryError> {
        if !self.open.swap(true, Ordering::AcqRel) {
            debug!("In-memory asset repository opened");
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), RepositoryError> {
        if self.open.swap(false, Ordering::AcqRel) {
            debug!("In-memory asset repository closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn insert(&self, draft: AssetDraft) -> Result<Asset, RepositoryError> {
        self.ensure_open()?;
        let mut rows = self.rows.write().await;
        if rows.contains_key(&draft.id) {
            return Err(RepositoryError::Conflict(draft.id));
        }

        let asset = draft.into_asset(Utc::now());
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        rows.insert(
            asset.id,
            Row {
                asset: asset.clone(),
                seq,
            },
        );
        Ok(asset)
    }

    async fn get(&self, id: AssetId) -> Result<Option<Asset>, RepositoryError> {
        self.ensure_open()?;
        Ok(self.rows.read().await.get(&id).map(|row| row.asset.clone()))
    }

    async fn list(
        &self,
        filter: &AssetFilter,
        limit: u64,
        offset: u64,
    ) -> Result<AssetPage, RepositoryError> {
        self.ensure_open()?;
        let rows = self.rows.read().await;

        let mut matching: Vec<&Row> = rows.values().filter(|r| filter.matches(&r.asset)).collect();
        matching.sort_by(|a, b| {
            b.asset
                .created_at
                .cmp(&a.asset.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        let total = matching.len() as u64;
        let assets = matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|r| r.asset.clone())
            .collect();

        Ok(AssetPage { assets, total })
    }

    async fn update(
        &self,
        id: AssetId,
        changes: AssetChanges,
    ) -> Result<Option<Asset>, RepositoryError> {
        self.ensure_open()?;
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(&id).map(|row| {
            changes.apply(&mut row.asset, Utc::now());
            row.asset.clone()
        }))
    }

    async fn delete(&self, id: AssetId) -> Result<bool, RepositoryError> {
        self.ensure_open()?;
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<HashMap<AssetId, Vec<AuxiliaryRecord>>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    async fn append(
        &self,
        asset_id: AssetId,
        kind: RecordKind,
        data: Value,
    ) -> Result<AuxiliaryRecord, RecordError> {
        let record = AuxiliaryRecord {
            id: Uuid::new_v4(),
            asset_id,
            kind,
            data,
            created_at: Utc::now(),
        };
        self.records
            .write()
            .await
            .entry(asset_id)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn list(
        &self,
        asset_id: AssetId,
        kind: Option<RecordKind>,
    ) -> Result<Vec<AuxiliaryRecord>, RecordError> {
        Ok(self
            .records
            .read()
            .await
            .get(&asset_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| kind.is_none_or(|k| r.kind == k))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn purge(&self, asset_id: AssetId) -> Result<u64, RecordError> {
        Ok(self
            .records
            .write()
            .await
            .remove(&asset_id)
            .map_or(0, |records| records.len() as u64))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBlobStorage {
    blobs: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl InMemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs, for assertions in tests.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

impl BlobStorage for InMemoryBlobStorage {
    async fn write_blob(&self, principal: &str, key: &str, data: Bytes) -> Result<(), StorageError> {
        authorize_key(principal, key)?;
        self.blobs.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn read_blob(&self, principal: &str, key: &str) -> Result<Bytes, StorageError> {
        authorize_key(principal, key)?;
        self.blobs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete_blob(&self, principal: &str, key: &str) -> Result<(), StorageError> {
        authorize_key(principal, key)?;
        self.blobs.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(owner: &str, name: &str, category: Category) -> AssetDraft {
        AssetDraft {
            id: Uuid::new_v4(),
            owner_id: owner.into(),
            name: name.into(),
            description: None,
            category,
            image_key: None,
        }
    }

    async fn opened() -> InMemoryAssetRepository {
        let repo = InMemoryAssetRepository::new();
        repo.open().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn closed_repository_refuses_work() {
        let repo = InMemoryAssetRepository::new();
        assert!(!repo.is_open());
        assert!(matches!(
            repo.get(Uuid::new_v4()).await,
            Err(RepositoryError::Closed)
        ));

        repo.open().await.unwrap();
        assert!(repo.is_open());
        let asset = repo.insert(draft("u1", "Laptop", Category::Other)).await.unwrap();

        repo.close().await.unwrap();
        assert!(matches!(repo.get(asset.id).await, Err(RepositoryError::Closed)));

        // reopening keeps the data
        repo.open().await.unwrap();
        assert_eq!(repo.get(asset.id).await.unwrap(), Some(asset));
    }

    #[tokio::test]
    async fn insert_sets_timestamps_and_rejects_duplicates() {
        let repo = opened().await;
        let d = draft("u1", "Laptop", Category::Other);
        let asset = repo.insert(d.clone()).await.unwrap();
        assert_eq!(asset.created_at, asset.updated_at);
        assert!(matches!(
            repo.insert(d).await,
            Err(RepositoryError::Conflict(id)) if id == asset.id
        ));
    }

    #[tokio::test]
    async fn list_filters_orders_and_pages() {
        let repo = opened().await;
        for i in 0..5 {
            repo.insert(draft("u1", &format!("a{i}"), Category::Image))
                .await
                .unwrap();
        }
        repo.insert(draft("u1", "doc", Category::Document)).await.unwrap();
        repo.insert(draft("u2", "other", Category::Image)).await.unwrap();

        let mut filter = AssetFilter::owned_by("u1");
        filter.category = Some("image".into());
        let page = repo.list(&filter, 2, 0).await.unwrap();
        assert_eq!(page.total, 5);
        let names: Vec<_> = page.assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a4", "a3"]);

        let tail = repo.list(&filter, 2, 4).await.unwrap();
        assert_eq!(tail.assets.len(), 1);
        assert_eq!(tail.assets[0].name, "a0");

        let all = repo.list(&AssetFilter::owned_by("u1"), 100, 0).await.unwrap();
        assert_eq!(all.total, 6);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let repo = opened().await;
        let asset = repo.insert(draft("u1", "Laptop", Category::Other)).await.unwrap();

        let changes = AssetChanges {
            name: Some("Desk".into()),
            ..Default::default()
        };
        let updated = repo.update(asset.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.name, "Desk");
        assert_eq!(updated.created_at, asset.created_at);
        assert!(updated.updated_at > asset.updated_at);

        assert!(repo.delete(asset.id).await.unwrap());
        assert!(!repo.delete(asset.id).await.unwrap());
        assert!(repo
            .update(asset.id, AssetChanges::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn records_are_keyed_by_asset() {
        let store = InMemoryRecordStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.append(a, RecordKind::Tag, json!("office")).await.unwrap();
        store.append(a, RecordKind::Status, json!("archived")).await.unwrap();
        store.append(b, RecordKind::Tag, json!("home")).await.unwrap();

        assert_eq!(store.list(a, None).await.unwrap().len(), 2);
        let tags = store.list(a, Some(RecordKind::Tag)).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].data, json!("office"));

        assert_eq!(store.purge(a).await.unwrap(), 2);
        assert!(store.list(a, None).await.unwrap().is_empty());
        assert_eq!(store.list(b, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blobs_are_principal_scoped() {
        let blobs = InMemoryBlobStorage::new();
        let key = blobs.blob_key("u1", Uuid::nil(), "photo.png");
        blobs
            .write_blob("u1", &key, Bytes::from_static(b"png"))
            .await
            .unwrap();

        assert_eq!(blobs.read_blob("u1", &key).await.unwrap(), "png");
        assert!(matches!(
            blobs.read_blob("u2", &key).await,
            Err(StorageError::Forbidden(_))
        ));
        assert!(matches!(
            blobs.delete_blob("u2", &key).await,
            Err(StorageError::Forbidden(_))
        ));

        blobs.delete_blob("u1", &key).await.unwrap();
        assert!(blobs.is_empty().await);
        assert!(matches!(
            blobs.read_blob("u1", &key).await,
            Err(StorageError::NotFound(_))
        ));
    }
}
