use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use ims_db::{DbError, Gateway, ListOrder};
use ims_store::BlobStore;
use ims_types::{
    archive_name, page_key, validate_page_name, Page, PageId, Project, ProjectId, ProjectStatus,
    Release, ReleaseId, ValidationError,
};
use serde::{Deserialize, Serialize};

use crate::archive::{self, BuiltArchive};
use crate::error::{CatalogError, CatalogResult};
use crate::lifecycle::{self, NewRelease, ReleaseUpdate};
use crate::thumbnail::{self, ThumbnailBounds};

/// Fields accepted when creating a project. Status defaults to `active`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub shorthand: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
}

/// The editable fields of a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub name: String,
    pub shorthand: String,
    #[serde(default)]
    pub description: String,
    pub status: ProjectStatus,
}

/// A page upload: the page name and base64 image data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPage {
    pub name: String,
    pub data: String,
}

/// An archive ready to be served.
///
/// `persist_error` is set when the archive's checksum differed from the
/// cached one and writing the new checksum back failed. The bytes are still
/// valid; only the cached checksum is stale.
#[derive(Debug)]
pub struct ArchiveDownload {
    pub file_name: String,
    pub archive: BuiltArchive,
    pub persist_error: Option<DbError>,
}

/// Counts of what a purge removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    pub pages: usize,
    pub releases: usize,
    pub projects: usize,
}

/// Collects failures of a best-effort cascade; only the last is kept.
#[derive(Default)]
struct PurgeLog {
    summary: PurgeSummary,
    failures: usize,
    last: Option<CatalogError>,
}

impl PurgeLog {
    fn record(&mut self, err: CatalogError) {
        tracing::warn!(error = %err, "purge step failed");
        match err {
            CatalogError::Purge { failures, last } => {
                self.failures += failures;
                self.last = Some(*last);
            }
            other => {
                self.failures += 1;
                self.last = Some(other);
            }
        }
    }

    fn finish(self) -> CatalogResult<PurgeSummary> {
        match self.last {
            Some(last) => Err(CatalogError::Purge {
                failures: self.failures,
                last: Box::new(last),
            }),
            None => Ok(self.summary),
        }
    }
}

/// Projects, releases and pages over an injected gateway and blob store.
///
/// Multi-step flows are not transactional. Page upload writes the blob
/// before the row and unsets it again if the row cannot be saved; page
/// deletion removes the row first and the blob after.
pub struct Catalog {
    gateway: Arc<dyn Gateway>,
    blobs: Arc<dyn BlobStore>,
    scanlator: String,
    thumbnails: ThumbnailBounds,
}

impl Catalog {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        blobs: Arc<dyn BlobStore>,
        scanlator: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            blobs,
            scanlator: scanlator.into(),
            thumbnails: ThumbnailBounds::default(),
        }
    }

    pub fn with_thumbnail_bounds(mut self, bounds: ThumbnailBounds) -> Self {
        self.thumbnails = bounds;
        self
    }

    // -- projects --

    pub fn list_projects(&self, order: ListOrder) -> CatalogResult<Vec<Project>> {
        Ok(self.gateway.list_projects(order)?)
    }

    pub fn get_project(&self, id: ProjectId) -> CatalogResult<Project> {
        Ok(self.gateway.find_project(id)?)
    }

    pub fn create_project(&self, request: &NewProject) -> CatalogResult<Project> {
        let project = Project::new(
            request.name.clone(),
            request.shorthand.clone(),
            request.description.clone(),
            request.status.unwrap_or(ProjectStatus::Active),
            Utc::now(),
        );
        project.validate()?;
        let saved = self.gateway.save_project(&project)?;
        tracing::info!(project = saved.id, shorthand = %saved.shorthand, "project created");
        Ok(saved)
    }

    pub fn update_project(&self, id: ProjectId, update: &ProjectUpdate) -> CatalogResult<Project> {
        let mut project = self.gateway.find_project(id)?;
        project.name = update.name.clone();
        project.shorthand = update.shorthand.clone();
        project.description = update.description.clone();
        project.status = update.status;
        project.validate()?;
        Ok(self.gateway.update_project(&project)?)
    }

    /// Delete a project that owns no releases.
    pub fn delete_project(&self, id: ProjectId) -> CatalogResult<()> {
        let project = self.gateway.find_project(id)?;
        let releases = self.gateway.list_releases(&project, ListOrder::Newest)?;
        lifecycle::ensure_project_deletable(releases.len())?;
        self.gateway.delete_project(&project)?;
        tracing::info!(project = id, "project deleted");
        Ok(())
    }

    // -- releases --

    pub fn list_releases(
        &self,
        project_id: ProjectId,
        order: ListOrder,
    ) -> CatalogResult<Vec<Release>> {
        let project = self.gateway.find_project(project_id)?;
        Ok(self.gateway.list_releases(&project, order)?)
    }

    pub fn get_release(&self, project_id: ProjectId, id: ReleaseId) -> CatalogResult<Release> {
        Ok(self.resolve(project_id, id)?.1)
    }

    pub fn create_release(
        &self,
        project_id: ProjectId,
        request: &NewRelease,
    ) -> CatalogResult<Release> {
        let project = self.gateway.find_project(project_id)?;
        let release = lifecycle::create_release(&project, request, &self.scanlator, Utc::now())?;
        let saved = self.gateway.save_release(&release)?;
        tracing::info!(
            project = project_id,
            release = saved.id,
            identifier = %saved.identifier,
            "release created"
        );
        Ok(saved)
    }

    /// Apply an edit through the release state machine and persist it.
    pub fn update_release(
        &self,
        project_id: ProjectId,
        id: ReleaseId,
        update: &ReleaseUpdate,
    ) -> CatalogResult<Release> {
        let (_, current) = self.resolve(project_id, id)?;
        let next = lifecycle::apply_update(&current, update, Utc::now())?;
        let saved = self.gateway.update_release(&next)?;
        tracing::info!(
            release = id,
            from_version = current.version,
            to_version = saved.version,
            status = %saved.status,
            "release updated"
        );
        Ok(saved)
    }

    /// Delete a release that owns no pages.
    pub fn delete_release(&self, project_id: ProjectId, id: ReleaseId) -> CatalogResult<()> {
        let (_, release) = self.resolve(project_id, id)?;
        let pages = self.gateway.list_pages(&release)?;
        lifecycle::ensure_release_deletable(pages.len())?;
        self.gateway.delete_release(&release)?;
        tracing::info!(project = project_id, release = id, "release deleted");
        Ok(())
    }

    // -- pages --

    pub fn list_pages(&self, project_id: ProjectId, release_id: ReleaseId) -> CatalogResult<Vec<Page>> {
        let (_, release) = self.resolve(project_id, release_id)?;
        Ok(self.gateway.list_pages(&release)?)
    }

    /// Decode, check and store an uploaded page.
    pub fn create_page(
        &self,
        project_id: ProjectId,
        release_id: ReleaseId,
        upload: &NewPage,
    ) -> CatalogResult<Page> {
        let (project, release) = self.resolve(project_id, release_id)?;
        let data = BASE64
            .decode(upload.data.as_bytes())
            .map_err(|e| CatalogError::BadImageData(e.to_string()))?;

        let page = Page::new(release.id, upload.name.clone(), Utc::now());
        check_upload(&page, &data)?;

        match self.gateway.find_page_by_name(&release, &page.name) {
            Ok(_) => return Err(CatalogError::PageExists(page.name)),
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }

        let key = page_key(project.id, release.id, &page.name);
        self.blobs.set(&key, &data)?;
        let saved = match self.gateway.save_page(&page) {
            Ok(saved) => saved,
            Err(err) => {
                if let Err(cleanup) = self.blobs.unset(&key) {
                    tracing::warn!(key = %key, error = %cleanup, "orphaned page blob");
                }
                return Err(err.into());
            }
        };
        tracing::info!(release = release.id, page = %saved.name, bytes = data.len(), "page stored");
        Ok(saved)
    }

    /// A page record and its image bytes.
    pub fn get_page(
        &self,
        project_id: ProjectId,
        release_id: ReleaseId,
        name: &str,
    ) -> CatalogResult<(Page, Vec<u8>)> {
        let (project, release) = self.resolve(project_id, release_id)?;
        let page = self.gateway.find_page_by_name(&release, name)?;
        let data = self.blobs.get(&page_key(project.id, release.id, &page.name))?;
        Ok((page, data))
    }

    /// Delete the page row, then its blob. A blob that cannot be removed is
    /// logged and left behind.
    pub fn delete_page(
        &self,
        project_id: ProjectId,
        release_id: ReleaseId,
        page_id: PageId,
    ) -> CatalogResult<()> {
        let (project, release) = self.resolve(project_id, release_id)?;
        let page = self.gateway.find_page(&release, page_id)?;
        self.gateway.delete_page(&page)?;
        let key = page_key(project.id, release.id, &page.name);
        if let Err(err) = self.blobs.unset(&key) {
            tracing::warn!(key = %key, error = %err, "page blob not removed");
        }
        tracing::info!(release = release.id, page = %page.name, "page deleted");
        Ok(())
    }

    /// A scaled-down copy of a page, in the page's own format.
    pub fn thumbnail(
        &self,
        project_id: ProjectId,
        release_id: ReleaseId,
        name: &str,
    ) -> CatalogResult<(Page, Vec<u8>)> {
        let (page, data) = self.get_page(project_id, release_id, name)?;
        let format = thumbnail::image_format(page.mime_type).ok_or_else(|| {
            CatalogError::WrongType {
                name: page.name.clone(),
                expected: "png or jpg".into(),
            }
        })?;
        let thumb = thumbnail::render(&data, format, self.thumbnails)?;
        Ok((page, thumb))
    }

    // -- archives --

    /// Build the archive named `file_name` for a released release.
    ///
    /// Drafts and names other than the canonical archive name are reported
    /// as not found. A changed checksum is written back to the release,
    /// restamping `released_on` without re-entering the edit guard. A failure
    /// to do so is returned alongside the archive.
    pub fn download_archive(
        &self,
        project_id: ProjectId,
        release_id: ReleaseId,
        file_name: &str,
    ) -> CatalogResult<ArchiveDownload> {
        let (project, release) = self.resolve(project_id, release_id)?;
        if !release.is_released() {
            return Err(CatalogError::NotReleased(release.id));
        }
        let expected = archive_name(&project, &release);
        if file_name != expected {
            return Err(CatalogError::ArchiveNotFound(file_name.to_string()));
        }

        let pages = self.gateway.list_pages(&release)?;
        let built = archive::build_archive(&pages, |page| {
            self.blobs.get(&page_key(project.id, release.id, &page.name))
        })?;

        let mut persist_error = None;
        if archive::is_stale(&release, &built) {
            let mut updated = release.clone();
            updated.checksum = built.checksum.clone();
            updated.released_on = Utc::now();
            match self.gateway.update_release(&updated) {
                Ok(_) => tracing::info!(
                    release = release.id,
                    checksum = %built.checksum,
                    "archive checksum refreshed"
                ),
                Err(err) => {
                    tracing::warn!(release = release.id, error = %err, "checksum not persisted");
                    persist_error = Some(err);
                }
            }
        }

        Ok(ArchiveDownload {
            file_name: expected,
            archive: built,
            persist_error,
        })
    }

    // -- purge --

    /// Remove a release with all of its pages, continuing past failures.
    pub fn purge_release(
        &self,
        project_id: ProjectId,
        release_id: ReleaseId,
    ) -> CatalogResult<PurgeSummary> {
        let (project, release) = self.resolve(project_id, release_id)?;
        let mut log = PurgeLog::default();
        self.purge_release_into(&project, &release, &mut log);
        log.finish()
    }

    /// Remove a project with all of its releases and pages, continuing past
    /// failures. The error, if any, is the last one encountered.
    pub fn purge_project(&self, project_id: ProjectId) -> CatalogResult<PurgeSummary> {
        let project = self.gateway.find_project(project_id)?;
        let mut log = PurgeLog::default();
        match self.gateway.list_releases(&project, ListOrder::Newest) {
            Ok(releases) => {
                for release in &releases {
                    self.purge_release_into(&project, release, &mut log);
                }
            }
            Err(err) => log.record(err.into()),
        }
        match self.gateway.delete_project(&project) {
            Ok(()) => log.summary.projects += 1,
            Err(err) => log.record(err.into()),
        }
        tracing::info!(project = project_id, failures = log.failures, "project purged");
        log.finish()
    }

    fn purge_release_into(&self, project: &Project, release: &Release, log: &mut PurgeLog) {
        match self.gateway.list_pages(release) {
            Ok(pages) => {
                for page in &pages {
                    match self.gateway.delete_page(page) {
                        Ok(()) => log.summary.pages += 1,
                        Err(err) => log.record(err.into()),
                    }
                    let key = page_key(project.id, release.id, &page.name);
                    if let Err(err) = self.blobs.unset(&key) {
                        log.record(err.into());
                    }
                }
            }
            Err(err) => log.record(err.into()),
        }
        match self.gateway.delete_release(release) {
            Ok(()) => log.summary.releases += 1,
            Err(err) => log.record(err.into()),
        }
    }

    fn resolve(&self, project_id: ProjectId, release_id: ReleaseId) -> CatalogResult<(Project, Release)> {
        let project = self.gateway.find_project(project_id)?;
        let release = self.gateway.find_release(&project, release_id)?;
        Ok((project, release))
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("scanlator", &self.scanlator)
            .field("thumbnails", &self.thumbnails)
            .finish_non_exhaustive()
    }
}

/// The name must classify as an image type, and the data must be a
/// decodable image of that same type.
fn check_upload(page: &Page, data: &[u8]) -> CatalogResult<()> {
    match validate_page_name(&page.name) {
        Ok(()) => {}
        Err(ValidationError::UnsupportedMimeType(name)) => {
            return Err(CatalogError::WrongType {
                name,
                expected: "png or jpg".into(),
            });
        }
        Err(other) => return Err(other.into()),
    }
    let wrong_type = || CatalogError::WrongType {
        name: page.name.clone(),
        expected: page.mime_type.to_string(),
    };
    if thumbnail::sniff(data) != page.mime_type {
        return Err(wrong_type());
    }
    let format = thumbnail::image_format(page.mime_type).ok_or_else(wrong_type)?;
    thumbnail::verify(data, format).map_err(|_| wrong_type())
}
