use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use ims_types::{Page, PageId, Project, ProjectId, Release, ReleaseId};

use crate::error::{DbError, DbResult};
use crate::traits::{Gateway, ListOrder};

/// Gateway operations that can be made to fail on an [`InMemoryGateway`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    FindProject,
    ListProjects,
    SaveProject,
    UpdateProject,
    DeleteProject,
    FindRelease,
    ListReleases,
    SaveRelease,
    UpdateRelease,
    DeleteRelease,
    FindPage,
    ListPages,
    SavePage,
    DeletePage,
}

/// In-memory gateway for tests, local demos, and embedding.
///
/// Individual operations can be switched to fail with
/// [`DbError::Unavailable`] through [`InMemoryGateway::fail_on`], which lets
/// callers exercise their backend-failure paths.
pub struct InMemoryGateway {
    inner: RwLock<GatewayState>,
}

#[derive(Default)]
struct GatewayState {
    last_project_id: ProjectId,
    last_release_id: ReleaseId,
    last_page_id: PageId,
    projects: BTreeMap<ProjectId, Project>,
    releases: BTreeMap<ReleaseId, Release>,
    pages: BTreeMap<PageId, Page>,
    faults: HashSet<GatewayOp>,
}

impl GatewayState {
    fn check(&self, op: GatewayOp) -> DbResult<()> {
        if self.faults.contains(&op) {
            return Err(DbError::Unavailable(format!("{op:?} disabled")));
        }
        Ok(())
    }
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(GatewayState::default()),
        }
    }

    /// Make every subsequent `op` fail until [`InMemoryGateway::clear_faults`].
    pub fn fail_on(&self, op: GatewayOp) {
        self.inner.write().expect("lock poisoned").faults.insert(op);
    }

    pub fn clear_faults(&self) {
        self.inner.write().expect("lock poisoned").faults.clear();
    }

    pub fn project_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").projects.len()
    }

    pub fn release_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").releases.len()
    }

    pub fn page_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").pages.len()
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Gateway for InMemoryGateway {
    fn find_project(&self, id: ProjectId) -> DbResult<Project> {
        let state = self.inner.read().expect("lock poisoned");
        state.check(GatewayOp::FindProject)?;
        state
            .projects
            .get(&id)
            .cloned()
            .ok_or(DbError::ProjectNotFound(id))
    }

    fn list_projects(&self, order: ListOrder) -> DbResult<Vec<Project>> {
        let state = self.inner.read().expect("lock poisoned");
        state.check(GatewayOp::ListProjects)?;
        let mut projects: Vec<Project> = state.projects.values().cloned().collect();
        projects.sort_by(|a, b| order.apply(a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))));
        Ok(projects)
    }

    fn save_project(&self, project: &Project) -> DbResult<Project> {
        project.validate()?;
        let mut state = self.inner.write().expect("lock poisoned");
        state.check(GatewayOp::SaveProject)?;
        if state.projects.values().any(|p| p.shorthand == project.shorthand) {
            return Err(DbError::Conflict(format!(
                "project shorthand {:?} already in use",
                project.shorthand
            )));
        }
        state.last_project_id += 1;
        let mut saved = project.clone();
        saved.id = state.last_project_id;
        state.projects.insert(saved.id, saved.clone());
        Ok(saved)
    }

    fn update_project(&self, project: &Project) -> DbResult<Project> {
        project.validate()?;
        let mut state = self.inner.write().expect("lock poisoned");
        state.check(GatewayOp::UpdateProject)?;
        if !state.projects.contains_key(&project.id) {
            return Err(DbError::ProjectNotFound(project.id));
        }
        if state
            .projects
            .values()
            .any(|p| p.id != project.id && p.shorthand == project.shorthand)
        {
            return Err(DbError::Conflict(format!(
                "project shorthand {:?} already in use",
                project.shorthand
            )));
        }
        state.projects.insert(project.id, project.clone());
        Ok(project.clone())
    }

    fn delete_project(&self, project: &Project) -> DbResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");
        state.check(GatewayOp::DeleteProject)?;
        if state.releases.values().any(|r| r.project_id == project.id) {
            return Err(DbError::Conflict(format!(
                "project {} still owns releases",
                project.id
            )));
        }
        state
            .projects
            .remove(&project.id)
            .map(|_| ())
            .ok_or(DbError::ProjectNotFound(project.id))
    }

    fn find_release(&self, project: &Project, id: ReleaseId) -> DbResult<Release> {
        let state = self.inner.read().expect("lock poisoned");
        state.check(GatewayOp::FindRelease)?;
        state
            .releases
            .get(&id)
            .filter(|r| r.project_id == project.id)
            .cloned()
            .ok_or(DbError::ReleaseNotFound(id))
    }

    fn list_releases(&self, project: &Project, order: ListOrder) -> DbResult<Vec<Release>> {
        let state = self.inner.read().expect("lock poisoned");
        state.check(GatewayOp::ListReleases)?;
        let mut releases: Vec<Release> = state
            .releases
            .values()
            .filter(|r| r.project_id == project.id)
            .cloned()
            .collect();
        releases.sort_by(|a, b| order.apply(a.released_on.cmp(&b.released_on).then(a.id.cmp(&b.id))));
        Ok(releases)
    }

    fn save_release(&self, release: &Release) -> DbResult<Release> {
        release.validate()?;
        let mut state = self.inner.write().expect("lock poisoned");
        state.check(GatewayOp::SaveRelease)?;
        if !state.projects.contains_key(&release.project_id) {
            return Err(DbError::ProjectNotFound(release.project_id));
        }
        state.last_release_id += 1;
        let mut saved = release.clone();
        saved.id = state.last_release_id;
        state.releases.insert(saved.id, saved.clone());
        Ok(saved)
    }

    fn update_release(&self, release: &Release) -> DbResult<Release> {
        release.validate()?;
        let mut state = self.inner.write().expect("lock poisoned");
        state.check(GatewayOp::UpdateRelease)?;
        match state.releases.get_mut(&release.id) {
            Some(existing) if existing.project_id == release.project_id => {
                *existing = release.clone();
                Ok(release.clone())
            }
            _ => Err(DbError::ReleaseNotFound(release.id)),
        }
    }

    fn delete_release(&self, release: &Release) -> DbResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");
        state.check(GatewayOp::DeleteRelease)?;
        if state.pages.values().any(|p| p.release_id == release.id) {
            return Err(DbError::Conflict(format!(
                "release {} still owns pages",
                release.id
            )));
        }
        state
            .releases
            .remove(&release.id)
            .map(|_| ())
            .ok_or(DbError::ReleaseNotFound(release.id))
    }

    fn find_page(&self, release: &Release, id: PageId) -> DbResult<Page> {
        let state = self.inner.read().expect("lock poisoned");
        state.check(GatewayOp::FindPage)?;
        state
            .pages
            .get(&id)
            .filter(|p| p.release_id == release.id)
            .cloned()
            .ok_or_else(|| DbError::PageNotFound(id.to_string()))
    }

    fn find_page_by_name(&self, release: &Release, name: &str) -> DbResult<Page> {
        let state = self.inner.read().expect("lock poisoned");
        state.check(GatewayOp::FindPage)?;
        state
            .pages
            .values()
            .find(|p| p.release_id == release.id && p.name == name)
            .cloned()
            .ok_or_else(|| DbError::PageNotFound(name.to_string()))
    }

    fn list_pages(&self, release: &Release) -> DbResult<Vec<Page>> {
        let state = self.inner.read().expect("lock poisoned");
        state.check(GatewayOp::ListPages)?;
        let mut pages: Vec<Page> = state
            .pages
            .values()
            .filter(|p| p.release_id == release.id)
            .cloned()
            .collect();
        pages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(pages)
    }

    fn save_page(&self, page: &Page) -> DbResult<Page> {
        page.validate()?;
        let mut state = self.inner.write().expect("lock poisoned");
        state.check(GatewayOp::SavePage)?;
        if !state.releases.contains_key(&page.release_id) {
            return Err(DbError::ReleaseNotFound(page.release_id));
        }
        if state
            .pages
            .values()
            .any(|p| p.release_id == page.release_id && p.name == page.name)
        {
            return Err(DbError::Conflict(format!(
                "page {:?} already exists in release {}",
                page.name, page.release_id
            )));
        }
        state.last_page_id += 1;
        let mut saved = page.clone();
        saved.id = state.last_page_id;
        state.pages.insert(saved.id, saved.clone());
        Ok(saved)
    }

    fn delete_page(&self, page: &Page) -> DbResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");
        state.check(GatewayOp::DeletePage)?;
        state
            .pages
            .remove(&page.id)
            .map(|_| ())
            .ok_or_else(|| DbError::PageNotFound(page.id.to_string()))
    }
}

impl std::fmt::Debug for InMemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGateway")
            .field("projects", &self.project_count())
            .field("releases", &self.release_count())
            .field("pages", &self.page_count())
            .finish()
    }
}
