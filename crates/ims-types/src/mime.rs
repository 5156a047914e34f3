//! Page image classification by filename suffix.
//!
//! Only lowercase `.png` and `.jpg` suffixes are recognized. Everything else,
//! `.jpeg` and upper-case variants included, classifies as
//! [`MimeType::Unknown`] and is rejected by page validation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const CONTENT_TYPE_PNG: &str = "image/png";
const CONTENT_TYPE_JPEG: &str = "image/jpeg";
const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// Image type of a page, derived from its name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MimeType {
    #[default]
    Unknown,
    Png,
    Jpg,
}

impl MimeType {
    /// Classify a filename by its suffix. Matching is case-sensitive.
    ///
    /// ```
    /// use ims_types::MimeType;
    ///
    /// assert_eq!(MimeType::classify("p001.png"), MimeType::Png);
    /// assert_eq!(MimeType::classify("p001.jpg"), MimeType::Jpg);
    /// assert_eq!(MimeType::classify("p001.JPG"), MimeType::Unknown);
    /// ```
    pub fn classify(name: &str) -> Self {
        if name.ends_with(".png") {
            Self::Png
        } else if name.ends_with(".jpg") {
            Self::Jpg
        } else {
            Self::Unknown
        }
    }

    /// The HTTP `Content-Type` for this type.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => CONTENT_TYPE_PNG,
            Self::Jpg => CONTENT_TYPE_JPEG,
            Self::Unknown => CONTENT_TYPE_OCTET_STREAM,
        }
    }

    /// Inverse of [`MimeType::content_type`]. Unrecognized strings map to
    /// [`MimeType::Unknown`].
    pub fn from_content_type(value: &str) -> Self {
        match value {
            CONTENT_TYPE_PNG => Self::Png,
            CONTENT_TYPE_JPEG => Self::Jpg,
            _ => Self::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

impl Serialize for MimeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.content_type())
    }
}

impl<'de> Deserialize<'de> for MimeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_content_type(&value))
    }
}
