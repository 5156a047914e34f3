use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::{validate_key, BlobStore};

/// In-memory, `BTreeMap`-based blob store.
///
/// Intended for tests and embedding. Blobs are held behind a `RwLock` and
/// cloned on read.
pub struct InMemoryBlobStore {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// All keys, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.blobs.read().expect("lock poisoned").keys().cloned().collect()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn set(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        validate_key(key)?;
        let mut map = self.blobs.write().expect("lock poisoned");
        if map.contains_key(key) {
            return Err(StoreError::KeyExists(key.to_string()));
        }
        map.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        validate_key(key)?;
        let map = self.blobs.read().expect("lock poisoned");
        map.get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn unset(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        let mut map = self.blobs.write().expect("lock poisoned");
        map.remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn exists(&self, key: &str) -> bool {
        self.blobs.read().expect("lock poisoned").contains_key(key)
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let store = InMemoryBlobStore::new();
        store.set("1/2/p1.png", b"png-bytes").unwrap();
        assert_eq!(store.get("1/2/p1.png").unwrap(), b"png-bytes");
        assert!(store.exists("1/2/p1.png"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn set_existing_key_fails() {
        let store = InMemoryBlobStore::new();
        store.set("1/2/p1.png", b"first").unwrap();
        let err = store.set("1/2/p1.png", b"second").unwrap_err();
        assert!(matches!(err, StoreError::KeyExists(k) if k == "1/2/p1.png"));
        // original data is untouched
        assert_eq!(store.get("1/2/p1.png").unwrap(), b"first");
    }

    #[test]
    fn get_and_unset_missing() {
        let store = InMemoryBlobStore::new();
        assert!(matches!(store.get("1/2/x.png"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.unset("1/2/x.png"), Err(StoreError::NotFound(_))));
        assert!(!store.exists("1/2/x.png"));
    }

    #[test]
    fn unset_removes() {
        let store = InMemoryBlobStore::new();
        store.set("k", b"v").unwrap();
        store.unset("k").unwrap();
        assert!(store.is_empty());
        // key can be reused after unset
        store.set("k", b"w").unwrap();
        assert_eq!(store.get("k").unwrap(), b"w");
    }

    #[test]
    fn invalid_keys_rejected() {
        let store = InMemoryBlobStore::new();
        assert!(matches!(
            store.set("../x", b"v"),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn keys_are_sorted() {
        let store = InMemoryBlobStore::default();
        store.set("b", b"").unwrap();
        store.set("a", b"").unwrap();
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
        assert!(format!("{store:?}").contains("blob_count"));
    }
}
