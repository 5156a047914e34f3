use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::mime::MimeType;
use crate::release::ReleaseId;

pub type PageId = u32;

/// Maximum length of a page name, in characters.
pub const MAX_PAGE_NAME_LEN: usize = 255;

/// Characters that would escape the page's blob key or break archive paths.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0'];

/// A single page image of a release.
///
/// Pages are immutable once created: they can be added and deleted but never
/// updated. `mime_type` is always derived from `name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub release_id: ReleaseId,
    pub mime_type: MimeType,
}

impl Page {
    /// A page not yet persisted (id 0). The MIME type is classified from
    /// `name`.
    pub fn new(release_id: ReleaseId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let name = name.into();
        Self {
            id: 0,
            mime_type: MimeType::classify(&name),
            name,
            created_at,
            release_id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_page_name(&self.name)
    }
}

/// Validate a page name: non-empty, at most 255 characters, a single path
/// component, and a recognized image suffix.
pub fn validate_page_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len == 0 {
        return Err(ValidationError::PageNameEmpty);
    }
    if len > MAX_PAGE_NAME_LEN {
        return Err(ValidationError::PageNameTooLong {
            len,
            max: MAX_PAGE_NAME_LEN,
        });
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(ValidationError::InvalidPageName {
            name: name.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }
    if name.starts_with('.') {
        return Err(ValidationError::InvalidPageName {
            name: name.to_string(),
            reason: "must not start with '.'".into(),
        });
    }
    if !MimeType::classify(name).is_known() {
        return Err(ValidationError::UnsupportedMimeType(name.to_string()));
    }
    Ok(())
}
