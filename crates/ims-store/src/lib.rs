//! Binary blob storage for page images.
//!
//! A blob store maps string keys (`{projectId}/{releaseId}/{pageName}`) to
//! raw bytes. It never interprets the bytes it holds.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FileBlobStore`] -- one file per key under a root directory
//!
//! # Rules
//!
//! 1. `set` never overwrites: writing an existing key fails with
//!    [`StoreError::KeyExists`].
//! 2. Keys are relative, `/`-separated paths; empty components, `.` and `..`
//!    are rejected before touching storage.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileBlobStore;
pub use memory::InMemoryBlobStore;
pub use traits::{validate_key, BlobStore};
