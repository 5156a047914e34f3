//! Release state machine.
//!
//! A release is either `draft` or `released`. Drafts may be edited freely as
//! long as the version never goes down. Once released, every edit must carry
//! a strictly higher version, and the identifier is frozen until the release
//! has gone back to draft.

use chrono::{DateTime, Utc};
use ims_types::{validate_release_fields, Project, Release, ReleaseStatus};
use serde::{Deserialize, Serialize};

use crate::error::{ReleaseError, ReleaseResult};

/// Fields accepted when creating a release. Omitted values default to
/// version 0 and `draft`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRelease {
    pub identifier: String,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub status: Option<ReleaseStatus>,
}

/// The user-editable fields of a release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseUpdate {
    pub identifier: String,
    pub version: u32,
    pub status: ReleaseStatus,
}

/// Build an unsaved release for `project`, stamped with `scanlator`.
pub fn create_release(
    project: &Project,
    request: &NewRelease,
    scanlator: &str,
    now: DateTime<Utc>,
) -> ReleaseResult<Release> {
    let status = request.status.unwrap_or(ReleaseStatus::Draft);
    validate_release_fields(&request.identifier, status)?;
    Ok(Release::new(
        project.id,
        request.identifier.clone(),
        scanlator,
        request.version.unwrap_or(0),
        status,
        now,
    ))
}

/// Check `update` against the edit guard and return the release as it should
/// be persisted. `released_on` is refreshed to `now`.
pub fn apply_update(
    current: &Release,
    update: &ReleaseUpdate,
    now: DateTime<Utc>,
) -> ReleaseResult<Release> {
    validate_release_fields(&update.identifier, update.status)?;
    check_edit(current, update)?;

    let mut next = current.clone();
    next.identifier = update.identifier.clone();
    next.version = update.version;
    next.status = update.status;
    next.released_on = now;
    Ok(next)
}

/// The edit guard alone, without field validation.
pub fn check_edit(current: &Release, update: &ReleaseUpdate) -> ReleaseResult<()> {
    if update.version < current.version {
        return Err(ReleaseError::DownversioningNotAllowed {
            current: current.version,
            requested: update.version,
        });
    }
    if current.status == ReleaseStatus::Released {
        if update.version == current.version {
            return Err(ReleaseError::MustUpversion {
                current: current.version,
            });
        }
        if update.identifier != current.identifier {
            return Err(ReleaseError::MustBeDraftFirst);
        }
    }
    Ok(())
}

/// A release may only be deleted once it owns no pages.
pub fn ensure_release_deletable(page_count: usize) -> ReleaseResult<()> {
    if page_count > 0 {
        return Err(ReleaseError::PagesNotEmpty { count: page_count });
    }
    Ok(())
}

/// A project may only be deleted once it owns no releases.
pub fn ensure_project_deletable(release_count: usize) -> ReleaseResult<()> {
    if release_count > 0 {
        return Err(ReleaseError::ReleasesNotEmpty {
            count: release_count,
        });
    }
    Ok(())
}
