//! # Stockroom FileSystem Blob Storage
//!
//! A local filesystem backend for asset images.
//!
//! This crate implements the [`BlobStorage`] trait, storing each blob under
//! `{root}/{principal}/{asset id}/{filename}`.
//!
//! ## Features
//!
//! * **Principal isolation**: Every access is checked against the caller's key prefix before the disk is touched.
//! * **Atomic Writes**: Uses temporary files and rename operations so images are never read partially.
//!
//! ## Usage
//!
//! ```no_run
//! use stockroom_fs::FileSystemBlobStorage;
//!
//! let storage = FileSystemBlobStorage::new("./stockroom_data");
//! ```

use bytes::Bytes;
use std::path::PathBuf;
use stockroom_core::prelude::*;
use tokio::fs;
use uuid::Uuid;

async fn atomic_write(path: &std::path::Path, data: Bytes) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(StorageError::Io)?;
    }

    // Hidden and unique per write, so concurrent uploads never share a staging file.
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(path.file_name().unwrap_or_default());
    tmp_name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, data).await.map_err(StorageError::Io)?;
    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(StorageError::Io(e));
    }

    Ok(())
}

#[derive(Clone)]
pub struct FileSystemBlobStorage {
    root: PathBuf,
}

impl FileSystemBlobStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    fn get_path(&self, principal: &str, key: &str) -> Result<PathBuf, StorageError> {
        authorize_key(principal, key)?;
        Ok(self.root.join(key))
    }
}

impl BlobStorage for FileSystemBlobStorage {
    async fn write_blob(&self, principal: &str, key: &str, data: Bytes) -> Result<(), StorageError> {
        let path = self.get_path(principal, key)?;
        atomic_write(&path, data).await
    }

    async fn read_blob(&self, principal: &str, key: &str) -> Result<Bytes, StorageError> {
        let path = self.get_path(principal, key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn delete_blob(&self, principal: &str, key: &str) -> Result<(), StorageError> {
        let path = self.get_path(principal, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
