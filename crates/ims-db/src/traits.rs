use ims_types::{Page, PageId, Project, ProjectId, Release, ReleaseId};

use crate::error::DbResult;

/// Sort direction for timestamp-keyed listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ListOrder {
    #[default]
    Newest,
    Oldest,
}

impl ListOrder {
    /// Parse the `ordering` query value: `newest` or `oldest`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "newest" => Some(Self::Newest),
            "oldest" => Some(Self::Oldest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }

    /// Apply this order to a comparison that sorts oldest first.
    pub fn apply(self, oldest_first: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Newest => oldest_first.reverse(),
            Self::Oldest => oldest_first,
        }
    }
}

/// Relational CRUD for projects, releases and pages.
///
/// Implementations must satisfy:
/// - `save_*` ignores the incoming `id` and returns the record with its
///   newly assigned id.
/// - `find_release` only finds releases owned by the given project, and
///   `find_page*` only pages owned by the given release.
/// - `list_pages` orders by page name ascending. `list_releases` orders by
///   `released_on` and `list_projects` by `created_at`, in the requested
///   [`ListOrder`], with ties broken by id in the same direction.
/// - Deleting a project that owns releases, or a release that owns pages,
///   fails with [`DbError::Conflict`](crate::DbError::Conflict).
/// - Each call is atomic on its own. No multi-call transaction is offered.
pub trait Gateway: Send + Sync {
    fn find_project(&self, id: ProjectId) -> DbResult<Project>;
    fn list_projects(&self, order: ListOrder) -> DbResult<Vec<Project>>;
    fn save_project(&self, project: &Project) -> DbResult<Project>;
    fn update_project(&self, project: &Project) -> DbResult<Project>;
    fn delete_project(&self, project: &Project) -> DbResult<()>;

    fn find_release(&self, project: &Project, id: ReleaseId) -> DbResult<Release>;
    fn list_releases(&self, project: &Project, order: ListOrder) -> DbResult<Vec<Release>>;
    fn save_release(&self, release: &Release) -> DbResult<Release>;
    fn update_release(&self, release: &Release) -> DbResult<Release>;
    fn delete_release(&self, release: &Release) -> DbResult<()>;

    fn find_page(&self, release: &Release, id: PageId) -> DbResult<Page>;
    fn find_page_by_name(&self, release: &Release, name: &str) -> DbResult<Page>;
    fn list_pages(&self, release: &Release) -> DbResult<Vec<Page>>;
    fn save_page(&self, page: &Page) -> DbResult<Page>;
    fn delete_page(&self, page: &Page) -> DbResult<()>;
}
