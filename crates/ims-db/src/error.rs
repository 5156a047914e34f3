use ims_types::{ProjectId, ReleaseId, ValidationError};

/// Errors from persistence gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("release not found: {0}")]
    ReleaseNotFound(ReleaseId),

    #[error("page not found: {0}")]
    PageNotFound(String),

    /// A uniqueness or foreign-key constraint rejected the write.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The record failed validation and was not written.
    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),

    /// A stored row could not be decoded into a record.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// The backend refused to serve the request.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound(_) | Self::ReleaseNotFound(_) | Self::PageNotFound(_)
        )
    }
}

/// Result alias for gateway operations.
pub type DbResult<T> = Result<T, DbError>;
