use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::traits::{validate_key, BlobStore};

/// Filesystem blob store: each key is a file path relative to `root`.
///
/// Parent directories are created on demand. Writes use `create_new`, so a
/// concurrent duplicate upload loses with [`StoreError::KeyExists`] instead of
/// overwriting.
#[derive(Clone, Debug)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, part| path.join(part)))
    }
}

impl BlobStore for FileBlobStore {
    fn set(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StoreError::KeyExists(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if let Err(e) = file.write_all(data).and_then(|_| file.sync_all()) {
            // Leave no truncated blob behind.
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }
        tracing::debug!(key, bytes = data.len(), "blob stored");
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let path = self.path_for(key)?;
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => e.into(),
        })
    }

    fn unset(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => e.into(),
        })?;
        tracing::debug!(key, "blob removed");
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        match self.path_for(key) {
            Ok(path) => path.exists(),
            Err(_) => false,
        }
    }
}
