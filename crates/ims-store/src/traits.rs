use crate::error::{StoreError, StoreResult};

/// Key-addressed binary storage.
///
/// All implementations must satisfy these invariants:
/// - `set` fails with [`StoreError::KeyExists`] rather than overwrite.
/// - `get` and `unset` fail with [`StoreError::NotFound`] for missing keys.
/// - Keys are validated with [`validate_key`] before any I/O.
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`.
    fn set(&self, key: &str, data: &[u8]) -> StoreResult<()>;

    /// Read the data stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Remove the data stored under `key`.
    fn unset(&self, key: &str) -> StoreResult<()>;

    /// Whether `key` currently holds data.
    fn exists(&self, key: &str) -> bool;
}

/// Validate a blob key: a non-empty relative path whose `/`-separated
/// components are non-empty and are neither `.` nor `..`.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key must not be empty"));
    }
    if key.starts_with('/') {
        return Err(invalid("key must be relative"));
    }
    if key.contains('\\') || key.contains('\0') {
        return Err(invalid("key contains a forbidden character"));
    }
    for component in key.split('/') {
        match component {
            "" => return Err(invalid("key components must not be empty")),
            "." | ".." => return Err(invalid("key components must not be '.' or '..'")),
            _ => {}
        }
    }
    Ok(())
}
