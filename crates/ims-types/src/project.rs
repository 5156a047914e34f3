use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub type ProjectId = u32;

/// Maximum length of a project's display name, in characters.
pub const MAX_NAME_LEN: usize = 255;
/// Maximum length of a project's shorthand, in characters.
pub const MAX_SHORTHAND_LEN: usize = 30;

/// Publishing status of a project.
///
/// `Unknown` is produced only when decoding an unrecognized value and is
/// rejected by [`Project::validate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Completed,
    Active,
    Stalled,
    Dropped,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ProjectStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "completed" => Self::Completed,
            "active" => Self::Active,
            "stalled" => Self::Stalled,
            "dropped" => Self::Dropped,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Completed => "completed",
            Self::Active => "active",
            Self::Stalled => "stalled",
            Self::Dropped => "dropped",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scanlation project. Owns zero or more releases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub shorthand: String,
    pub description: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// A project not yet persisted (id 0).
    pub fn new(
        name: impl Into<String>,
        shorthand: impl Into<String>,
        description: impl Into<String>,
        status: ProjectStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            shorthand: shorthand.into(),
            description: description.into(),
            status,
            created_at,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let name_len = self.name.chars().count();
        if name_len == 0 {
            return Err(ValidationError::ProjectNameEmpty);
        }
        if name_len > MAX_NAME_LEN {
            return Err(ValidationError::ProjectNameTooLong {
                len: name_len,
                max: MAX_NAME_LEN,
            });
        }
        let shorthand_len = self.shorthand.chars().count();
        if shorthand_len == 0 {
            return Err(ValidationError::ShorthandEmpty);
        }
        if shorthand_len > MAX_SHORTHAND_LEN {
            return Err(ValidationError::ShorthandTooLong {
                len: shorthand_len,
                max: MAX_SHORTHAND_LEN,
            });
        }
        if self.status == ProjectStatus::Unknown {
            return Err(ValidationError::InvalidProjectStatus);
        }
        Ok(())
    }
}
