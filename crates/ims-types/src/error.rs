use thiserror::Error;

/// Field-level validation failures for projects, releases and pages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("project name must not be empty")]
    ProjectNameEmpty,

    #[error("project name is too long: {len} characters (max {max})")]
    ProjectNameTooLong { len: usize, max: usize },

    #[error("project shorthand must not be empty")]
    ShorthandEmpty,

    #[error("project shorthand is too long: {len} characters (max {max})")]
    ShorthandTooLong { len: usize, max: usize },

    #[error("invalid project status")]
    InvalidProjectStatus,

    #[error("release identifier is too long: {len} characters (max {max})")]
    IdentifierTooLong { len: usize, max: usize },

    #[error("invalid release status")]
    InvalidReleaseStatus,

    #[error("page name must not be empty")]
    PageNameEmpty,

    #[error("page name is too long: {len} characters (max {max})")]
    PageNameTooLong { len: usize, max: usize },

    #[error("invalid page name {name:?}: {reason}")]
    InvalidPageName { name: String, reason: String },

    #[error("unsupported page type for {0:?}")]
    UnsupportedMimeType(String),
}
