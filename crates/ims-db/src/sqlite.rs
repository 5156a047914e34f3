use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use ims_types::{
    MimeType, Page, PageId, Project, ProjectId, ProjectStatus, Release, ReleaseId, ReleaseStatus,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{DbError, DbResult};
use crate::traits::{Gateway, ListOrder};

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS projects (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    shorthand   TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    status      TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS releases (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier  TEXT NOT NULL,
    scanlator   TEXT NOT NULL,
    version     INTEGER NOT NULL DEFAULT 0,
    status      TEXT NOT NULL,
    checksum    TEXT NOT NULL DEFAULT '',
    released_on TEXT NOT NULL,
    project_id  INTEGER NOT NULL REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS pages (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    release_id  INTEGER NOT NULL REFERENCES releases(id),
    mime_type   TEXT NOT NULL,
    UNIQUE (release_id, name)
);

CREATE INDEX IF NOT EXISTS idx_releases_project ON releases(project_id);
CREATE INDEX IF NOT EXISTS idx_pages_release ON pages(release_id);
"#;

const PROJECT_COLUMNS: &str = "id, name, shorthand, description, status, created_at";
const RELEASE_COLUMNS: &str =
    "id, identifier, scanlator, version, status, checksum, released_on, project_id";
const PAGE_COLUMNS: &str = "id, name, created_at, release_id, mime_type";

/// SQLite-backed gateway.
///
/// A single connection guarded by a mutex; every trait call runs one
/// statement (or one lookup plus one statement) while holding the lock.
pub struct SqliteGateway {
    conn: Mutex<Connection>,
}

impl SqliteGateway {
    /// Open (or create) the database file at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "opened release database");
        Self::with_connection(conn)
    }

    /// A private in-memory database, mostly for tests.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> DbResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
        let status: String = row.get(4)?;
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            shorthand: row.get(2)?,
            description: row.get(3)?,
            status: ProjectStatus::parse(&status),
            created_at: row.get::<_, DateTime<Utc>>(5)?,
        })
    }

    fn row_to_release(row: &Row<'_>) -> rusqlite::Result<Release> {
        let status: String = row.get(4)?;
        Ok(Release {
            id: row.get(0)?,
            identifier: row.get(1)?,
            scanlator: row.get(2)?,
            version: row.get(3)?,
            status: ReleaseStatus::parse(&status),
            checksum: row.get(5)?,
            released_on: row.get::<_, DateTime<Utc>>(6)?,
            project_id: row.get(7)?,
        })
    }

    fn row_to_page(row: &Row<'_>) -> rusqlite::Result<Page> {
        let mime: String = row.get(4)?;
        Ok(Page {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get::<_, DateTime<Utc>>(2)?,
            release_id: row.get(3)?,
            mime_type: MimeType::from_content_type(&mime),
        })
    }
}

fn inserted_id(conn: &Connection) -> DbResult<u32> {
    let rowid = conn.last_insert_rowid();
    u32::try_from(rowid).map_err(|_| DbError::Corrupt(format!("row id {rowid} out of range")))
}

/// Map constraint failures to domain errors. A foreign-key failure on insert
/// means the owner row is gone, which `on_missing_owner` describes.
fn write_error(err: rusqlite::Error, on_missing_owner: impl FnOnce() -> DbError) -> DbError {
    if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
            return on_missing_owner();
        }
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            return DbError::Conflict(message.clone().unwrap_or_else(|| failure.to_string()));
        }
    }
    DbError::Sqlite(err)
}

fn sql_direction(order: ListOrder) -> &'static str {
    match order {
        ListOrder::Newest => "DESC",
        ListOrder::Oldest => "ASC",
    }
}

/// Foreign-key failures on delete mean dependent rows still exist.
fn delete_error(err: rusqlite::Error) -> DbError {
    if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            return DbError::Conflict(message.clone().unwrap_or_else(|| failure.to_string()));
        }
    }
    DbError::Sqlite(err)
}

impl Gateway for SqliteGateway {
    fn find_project(&self, id: ProjectId) -> DbResult<Project> {
        let conn = self.conn.lock().expect("lock poisoned");
        conn.query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
            [id],
            Self::row_to_project,
        )
        .optional()?
        .ok_or(DbError::ProjectNotFound(id))
    }

    fn list_projects(&self, order: ListOrder) -> DbResult<Vec<Project>> {
        let conn = self.conn.lock().expect("lock poisoned");
        let dir = sql_direction(order);
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at {dir}, id {dir}"
        ))?;
        let projects = stmt
            .query_map([], Self::row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    fn save_project(&self, project: &Project) -> DbResult<Project> {
        project.validate()?;
        let conn = self.conn.lock().expect("lock poisoned");
        conn.execute(
            "INSERT INTO projects (name, shorthand, description, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.name,
                project.shorthand,
                project.description,
                project.status.as_str(),
                project.created_at,
            ],
        )
        .map_err(|e| write_error(e, || DbError::Conflict("project insert rejected".into())))?;
        let mut saved = project.clone();
        saved.id = inserted_id(&conn)?;
        tracing::debug!(id = saved.id, shorthand = %saved.shorthand, "project saved");
        Ok(saved)
    }

    fn update_project(&self, project: &Project) -> DbResult<Project> {
        project.validate()?;
        let conn = self.conn.lock().expect("lock poisoned");
        let changed = conn
            .execute(
                "UPDATE projects SET name = ?1, shorthand = ?2, description = ?3, status = ?4
                 WHERE id = ?5",
                params![
                    project.name,
                    project.shorthand,
                    project.description,
                    project.status.as_str(),
                    project.id,
                ],
            )
            .map_err(|e| write_error(e, || DbError::ProjectNotFound(project.id)))?;
        if changed == 0 {
            return Err(DbError::ProjectNotFound(project.id));
        }
        Ok(project.clone())
    }

    fn delete_project(&self, project: &Project) -> DbResult<()> {
        let conn = self.conn.lock().expect("lock poisoned");
        let changed = conn
            .execute("DELETE FROM projects WHERE id = ?1", [project.id])
            .map_err(delete_error)?;
        if changed == 0 {
            return Err(DbError::ProjectNotFound(project.id));
        }
        Ok(())
    }

    fn find_release(&self, project: &Project, id: ReleaseId) -> DbResult<Release> {
        let conn = self.conn.lock().expect("lock poisoned");
        conn.query_row(
            &format!("SELECT {RELEASE_COLUMNS} FROM releases WHERE id = ?1 AND project_id = ?2"),
            [id, project.id],
            Self::row_to_release,
        )
        .optional()?
        .ok_or(DbError::ReleaseNotFound(id))
    }

    fn list_releases(&self, project: &Project, order: ListOrder) -> DbResult<Vec<Release>> {
        let conn = self.conn.lock().expect("lock poisoned");
        let dir = sql_direction(order);
        let mut stmt = conn.prepare(&format!(
            "SELECT {RELEASE_COLUMNS} FROM releases WHERE project_id = ?1
             ORDER BY released_on {dir}, id {dir}"
        ))?;
        let releases = stmt
            .query_map([project.id], Self::row_to_release)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(releases)
    }

    fn save_release(&self, release: &Release) -> DbResult<Release> {
        release.validate()?;
        let conn = self.conn.lock().expect("lock poisoned");
        conn.execute(
            "INSERT INTO releases
             (identifier, scanlator, version, status, checksum, released_on, project_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                release.identifier,
                release.scanlator,
                release.version,
                release.status.as_str(),
                release.checksum,
                release.released_on,
                release.project_id,
            ],
        )
        .map_err(|e| write_error(e, || DbError::ProjectNotFound(release.project_id)))?;
        let mut saved = release.clone();
        saved.id = inserted_id(&conn)?;
        tracing::debug!(id = saved.id, project = saved.project_id, "release saved");
        Ok(saved)
    }

    fn update_release(&self, release: &Release) -> DbResult<Release> {
        release.validate()?;
        let conn = self.conn.lock().expect("lock poisoned");
        let changed = conn
            .execute(
                "UPDATE releases SET identifier = ?1, scanlator = ?2, version = ?3, status = ?4,
                 checksum = ?5, released_on = ?6
                 WHERE id = ?7 AND project_id = ?8",
                params![
                    release.identifier,
                    release.scanlator,
                    release.version,
                    release.status.as_str(),
                    release.checksum,
                    release.released_on,
                    release.id,
                    release.project_id,
                ],
            )
            .map_err(|e| write_error(e, || DbError::ReleaseNotFound(release.id)))?;
        if changed == 0 {
            return Err(DbError::ReleaseNotFound(release.id));
        }
        Ok(release.clone())
    }

    fn delete_release(&self, release: &Release) -> DbResult<()> {
        let conn = self.conn.lock().expect("lock poisoned");
        let changed = conn
            .execute("DELETE FROM releases WHERE id = ?1", [release.id])
            .map_err(delete_error)?;
        if changed == 0 {
            return Err(DbError::ReleaseNotFound(release.id));
        }
        Ok(())
    }

    fn find_page(&self, release: &Release, id: PageId) -> DbResult<Page> {
        let conn = self.conn.lock().expect("lock poisoned");
        conn.query_row(
            &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = ?1 AND release_id = ?2"),
            [id, release.id],
            Self::row_to_page,
        )
        .optional()?
        .ok_or_else(|| DbError::PageNotFound(id.to_string()))
    }

    fn find_page_by_name(&self, release: &Release, name: &str) -> DbResult<Page> {
        let conn = self.conn.lock().expect("lock poisoned");
        conn.query_row(
            &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE name = ?1 AND release_id = ?2"),
            params![name, release.id],
            Self::row_to_page,
        )
        .optional()?
        .ok_or_else(|| DbError::PageNotFound(name.to_string()))
    }

    fn list_pages(&self, release: &Release) -> DbResult<Vec<Page>> {
        let conn = self.conn.lock().expect("lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE release_id = ?1 ORDER BY name ASC"
        ))?;
        let pages = stmt
            .query_map([release.id], Self::row_to_page)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }

    fn save_page(&self, page: &Page) -> DbResult<Page> {
        page.validate()?;
        let conn = self.conn.lock().expect("lock poisoned");
        conn.execute(
            "INSERT INTO pages (name, created_at, release_id, mime_type)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                page.name,
                page.created_at,
                page.release_id,
                page.mime_type.content_type(),
            ],
        )
        .map_err(|e| write_error(e, || DbError::ReleaseNotFound(page.release_id)))?;
        let mut saved = page.clone();
        saved.id = inserted_id(&conn)?;
        Ok(saved)
    }

    fn delete_page(&self, page: &Page) -> DbResult<()> {
        let conn = self.conn.lock().expect("lock poisoned");
        let changed = conn
            .execute("DELETE FROM pages WHERE id = ?1", [page.id])
            .map_err(delete_error)?;
        if changed == 0 {
            return Err(DbError::PageNotFound(page.id.to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SqliteGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteGateway").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn project(db: &SqliteGateway, shorthand: &str) -> Project {
        db.save_project(&Project::new(
            "Some Manga",
            shorthand,
            "a description",
            ProjectStatus::Active,
            Utc::now(),
        ))
        .unwrap()
    }

    fn release(db: &SqliteGateway, project: &Project, identifier: &str) -> Release {
        db.save_release(&Release::new(
            project.id,
            identifier,
            "ims",
            0,
            ReleaseStatus::Draft,
            Utc::now(),
        ))
        .unwrap()
    }

    #[test]
    fn project_roundtrip() {
        let db = SqliteGateway::open_in_memory().unwrap();
        let saved = project(&db, "sm");
        assert!(saved.id > 0);
        let found = db.find_project(saved.id).unwrap();
        assert_eq!(found.shorthand, "sm");
        assert_eq!(found.status, ProjectStatus::Active);
        assert_eq!(found.created_at, saved.created_at);
    }

    #[test]
    fn duplicate_shorthand_is_conflict() {
        let db = SqliteGateway::open_in_memory().unwrap();
        project(&db, "sm");
        let err = db
            .save_project(&Project::new("Other", "sm", "", ProjectStatus::Active, Utc::now()))
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)), "{err:?}");
    }

    #[test]
    fn release_scoped_to_project() {
        let db = SqliteGateway::open_in_memory().unwrap();
        let a = project(&db, "a");
        let b = project(&db, "b");
        let r = release(&db, &a, "c1");
        assert_eq!(db.find_release(&a, r.id).unwrap(), r);
        assert!(db.find_release(&b, r.id).unwrap_err().is_not_found());
    }

    #[test]
    fn release_update_persists_fields() {
        let db = SqliteGateway::open_in_memory().unwrap();
        let p = project(&db, "sm");
        let mut r = release(&db, &p, "c1");
        r.status = ReleaseStatus::Released;
        r.version = 2;
        r.checksum = "deadbeef".into();
        db.update_release(&r).unwrap();
        let found = db.find_release(&p, r.id).unwrap();
        assert_eq!(found.status, ReleaseStatus::Released);
        assert_eq!(found.version, 2);
        assert_eq!(found.checksum, "deadbeef");
    }

    #[test]
    fn update_missing_release_is_not_found() {
        let db = SqliteGateway::open_in_memory().unwrap();
        let p = project(&db, "sm");
        let mut r = Release::new(p.id, "c1", "ims", 0, ReleaseStatus::Draft, Utc::now());
        r.id = 77;
        assert!(matches!(
            db.update_release(&r),
            Err(DbError::ReleaseNotFound(77))
        ));
    }

    #[test]
    fn releases_follow_requested_order() {
        let db = SqliteGateway::open_in_memory().unwrap();
        let p = project(&db, "sm");
        let old = db
            .save_release(&Release::new(
                p.id,
                "c1",
                "ims",
                0,
                ReleaseStatus::Draft,
                Utc::now() - Duration::days(2),
            ))
            .unwrap();
        let new = release(&db, &p, "c2");
        let ids: Vec<_> = db
            .list_releases(&p, ListOrder::Newest)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![new.id, old.id]);
        let ids: Vec<_> = db
            .list_releases(&p, ListOrder::Oldest)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![old.id, new.id]);
    }

    #[test]
    fn pages_sorted_and_unique() {
        let db = SqliteGateway::open_in_memory().unwrap();
        let p = project(&db, "sm");
        let r = release(&db, &p, "c1");
        for name in ["b.png", "a.jpg", "c.png"] {
            db.save_page(&Page::new(r.id, name, Utc::now())).unwrap();
        }
        let pages = db.list_pages(&r).unwrap();
        let names: Vec<_> = pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.png"]);
        assert_eq!(pages[0].mime_type, MimeType::Jpg);

        let err = db.save_page(&Page::new(r.id, "a.jpg", Utc::now())).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)), "{err:?}");

        let by_name = db.find_page_by_name(&r, "b.png").unwrap();
        assert_eq!(db.find_page(&r, by_name.id).unwrap(), by_name);
    }

    #[test]
    fn page_for_missing_release_is_rejected() {
        let db = SqliteGateway::open_in_memory().unwrap();
        let err = db.save_page(&Page::new(404, "a.png", Utc::now())).unwrap_err();
        assert!(matches!(err, DbError::ReleaseNotFound(404)), "{err:?}");
    }

    #[test]
    fn delete_with_dependents_is_conflict() {
        let db = SqliteGateway::open_in_memory().unwrap();
        let p = project(&db, "sm");
        let r = release(&db, &p, "c1");
        assert!(matches!(db.delete_project(&p), Err(DbError::Conflict(_))));
        db.delete_release(&r).unwrap();
        db.delete_project(&p).unwrap();
        assert!(db.find_project(p.id).unwrap_err().is_not_found());
    }

    #[test]
    fn invalid_records_never_written() {
        let db = SqliteGateway::open_in_memory().unwrap();
        let p = project(&db, "sm");
        let bad = Release::new(p.id, "c1", "ims", 0, ReleaseStatus::Unknown, Utc::now());
        assert!(matches!(db.save_release(&bad), Err(DbError::Invalid(_))));
        assert!(db.list_releases(&p, ListOrder::Newest).unwrap().is_empty());
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ims.db");
        let id = {
            let db = SqliteGateway::open(&path).unwrap();
            project(&db, "sm").id
        };
        let db = SqliteGateway::open(&path).unwrap();
        assert_eq!(db.find_project(id).unwrap().shorthand, "sm");
    }
}
