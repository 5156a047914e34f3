//! Foundation types for IMS Release.
//!
//! This crate provides the records and pure rules shared by every other
//! `ims-*` crate: the scanlation project/release/page model, the status
//! enums, the page MIME classifier, and the deterministic naming scheme used
//! for blob keys and release archives.
//!
//! # Key Types
//!
//! - [`Project`] — a scanlation project identified by a unique shorthand
//! - [`Release`] — one versioned chapter release under a project
//! - [`Page`] — a single page image belonging to a release
//! - [`MimeType`] — page image type derived from the filename suffix
//! - [`ValidationError`] — field-level validation failures

pub mod error;
pub mod mime;
pub mod naming;
pub mod page;
pub mod project;
pub mod release;

pub use error::ValidationError;
pub use mime::MimeType;
pub use naming::{archive_name, page_key};
pub use page::{validate_page_name, Page, PageId};
pub use project::{Project, ProjectId, ProjectStatus};
pub use release::{validate_fields as validate_release_fields, Release, ReleaseId, ReleaseStatus};
