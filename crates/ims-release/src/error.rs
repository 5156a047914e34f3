use ims_db::DbError;
use ims_store::StoreError;
use ims_types::ValidationError;

/// Violations of the release lifecycle rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReleaseError {
    #[error("invalid release status")]
    InvalidStatus,

    #[error("release identifier is {len} characters, at most {max} allowed")]
    IdentifierTooLong { len: usize, max: usize },

    #[error("release must be returned to draft before it can be edited")]
    MustBeDraftFirst,

    #[error("cannot lower release version from {current} to {requested}")]
    DownversioningNotAllowed { current: u32, requested: u32 },

    #[error("released chapter must be upversioned past {current} to be edited")]
    MustUpversion { current: u32 },

    #[error("release still owns {count} page(s)")]
    PagesNotEmpty { count: usize },

    #[error("project still owns {count} release(s)")]
    ReleasesNotEmpty { count: usize },

    #[error(transparent)]
    Invalid(ValidationError),
}

impl From<ValidationError> for ReleaseError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidReleaseStatus => Self::InvalidStatus,
            ValidationError::IdentifierTooLong { len, max } => Self::IdentifierTooLong { len, max },
            other => Self::Invalid(other),
        }
    }
}

pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Failures while assembling a release archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to read page {page}: {source}")]
    PageUnavailable {
        page: String,
        #[source]
        source: StoreError,
    },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Coarse classification used by callers to pick a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad field values or malformed input.
    Validation,
    NotFound,
    /// Duplicate names or keys.
    Conflict,
    /// An edit that conflicts with the release's current state: must be
    /// draft first, downversioning, or a missing upversion.
    EditConflict,
    /// Delete blocked by child rows, or upload content rejected.
    Precondition,
    /// Blob or relational backend failure.
    Storage,
}

/// Errors from [`crate::Catalog`] operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("page data is not valid base64: {0}")]
    BadImageData(String),

    #[error("uploaded image {name} is not a valid {expected} image")]
    WrongType { name: String, expected: String },

    /// Downloads of drafts are reported as missing.
    #[error("release {0} is not released")]
    NotReleased(ims_types::ReleaseId),

    #[error("no archive named {0}")]
    ArchiveNotFound(String),

    #[error("page already exists: {0}")]
    PageExists(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("thumbnail error: {0}")]
    Thumbnail(#[from] image::ImageError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{failures} deletion(s) failed, last: {last}")]
    Purge {
        failures: usize,
        last: Box<CatalogError>,
    },
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Release(ReleaseError::Invalid(_)) => ErrorKind::Validation,
            Self::Release(ReleaseError::InvalidStatus)
            | Self::Release(ReleaseError::IdentifierTooLong { .. }) => ErrorKind::Validation,
            Self::Release(ReleaseError::MustBeDraftFirst)
            | Self::Release(ReleaseError::DownversioningNotAllowed { .. })
            | Self::Release(ReleaseError::MustUpversion { .. }) => ErrorKind::EditConflict,
            Self::Release(_) | Self::BadImageData(_) | Self::WrongType { .. } => {
                ErrorKind::Precondition
            }
            Self::NotReleased(_) | Self::ArchiveNotFound(_) => ErrorKind::NotFound,
            Self::PageExists(_) => ErrorKind::Conflict,
            Self::Db(err) if err.is_not_found() => ErrorKind::NotFound,
            Self::Db(DbError::Conflict(_)) => ErrorKind::Conflict,
            Self::Db(DbError::Invalid(_)) => ErrorKind::Validation,
            Self::Store(StoreError::KeyExists(_)) => ErrorKind::Conflict,
            Self::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            Self::Store(StoreError::InvalidKey { .. }) => ErrorKind::Validation,
            Self::Db(_) | Self::Store(_) | Self::Archive(_) | Self::Thumbnail(_) => {
                ErrorKind::Storage
            }
            Self::Purge { last, .. } => last.kind(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
