use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::project::ProjectId;

pub type ReleaseId = u32;

/// Maximum length of a release identifier, in characters.
pub const MAX_IDENTIFIER_LEN: usize = 10;

/// Lifecycle status of a release.
///
/// `Unknown` is a decode sentinel only; it never passes
/// [`Release::validate`] and so is never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    Released,
    Draft,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ReleaseStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "released" => Self::Released,
            "draft" => Self::Draft,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Released => "released",
            Self::Draft => "draft",
        }
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One versioned release (typically a chapter) of a project.
///
/// `checksum` caches the CRC32 of the most recently built archive; it is
/// empty until the first archive is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: ReleaseId,
    pub identifier: String,
    pub scanlator: String,
    pub version: u32,
    pub status: ReleaseStatus,
    pub checksum: String,
    pub released_on: DateTime<Utc>,
    pub project_id: ProjectId,
}

impl Release {
    /// A release not yet persisted (id 0, empty checksum).
    pub fn new(
        project_id: ProjectId,
        identifier: impl Into<String>,
        scanlator: impl Into<String>,
        version: u32,
        status: ReleaseStatus,
        released_on: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            identifier: identifier.into(),
            scanlator: scanlator.into(),
            version,
            status,
            checksum: String::new(),
            released_on,
            project_id,
        }
    }

    pub fn is_released(&self) -> bool {
        self.status == ReleaseStatus::Released
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.identifier, self.status)
    }
}

/// Check the user-editable fields of a release.
pub fn validate_fields(identifier: &str, status: ReleaseStatus) -> Result<(), ValidationError> {
    if status == ReleaseStatus::Unknown {
        return Err(ValidationError::InvalidReleaseStatus);
    }
    let len = identifier.chars().count();
    if len > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::IdentifierTooLong {
            len,
            max: MAX_IDENTIFIER_LEN,
        });
    }
    Ok(())
}
