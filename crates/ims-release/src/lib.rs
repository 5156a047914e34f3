//! Release lifecycle and archive generation for IMS Release.
//!
//! - [`lifecycle`] — the draft/released state machine and cascade guards
//! - [`archive`] — deterministic zip assembly and CRC32 checksums
//! - [`thumbnail`] — image sniffing and thumbnail rendering
//! - [`Catalog`] — the multi-step flows over a [`ims_db::Gateway`] and an
//!   [`ims_store::BlobStore`]: uploads, gated deletes, downloads and purges

pub mod archive;
pub mod catalog;
pub mod error;
pub mod lifecycle;
pub mod thumbnail;

pub use archive::{build_archive, checksum, is_stale, BuiltArchive};
pub use catalog::{ArchiveDownload, Catalog, NewPage, NewProject, ProjectUpdate, PurgeSummary};
pub use error::{
    ArchiveError, ArchiveResult, CatalogError, CatalogResult, ErrorKind, ReleaseError,
    ReleaseResult,
};
pub use lifecycle::{apply_update, create_release, NewRelease, ReleaseUpdate};
pub use thumbnail::ThumbnailBounds;
