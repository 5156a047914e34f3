//! Deterministic names derived from records.

use crate::project::{Project, ProjectId};
use crate::release::{Release, ReleaseId};

/// Canonical archive filename for a release:
/// `"{shorthand} - {identifier}[{version}][{scanlator}].zip"`.
///
/// Downloads are served only when the requested filename equals this value
/// exactly.
///
/// ```
/// use chrono::Utc;
/// use ims_types::{archive_name, Project, ProjectStatus, Release, ReleaseStatus};
///
/// let project = Project::new("Name", "short", "", ProjectStatus::Active, Utc::now());
/// let release = Release::new(0, "v1", "scans", 1, ReleaseStatus::Released, Utc::now());
/// assert_eq!(archive_name(&project, &release), "short - v1[1][scans].zip");
/// ```
pub fn archive_name(project: &Project, release: &Release) -> String {
    format!(
        "{} - {}[{}][{}].zip",
        project.shorthand, release.identifier, release.version, release.scanlator
    )
}

/// Blob store key of a page: `"{projectId}/{releaseId}/{pageName}"`.
pub fn page_key(project_id: ProjectId, release_id: ReleaseId, page_name: &str) -> String {
    format!("{project_id}/{release_id}/{page_name}")
}
