use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use ims_release::ThumbnailBounds;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Thumbnail size limits, in pixels.
pub type ThumbnailConfig = ThumbnailBounds;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Root of the page blob store.
    pub image_directory: PathBuf,
    pub database_path: PathBuf,
    /// The scanlation group stamped on every release.
    pub scanlator: String,
    /// When set, POST/PUT/DELETE must carry a matching `Auth-Token` header.
    pub auth_token: Option<String>,
    pub max_upload_bytes: usize,
    pub thumbnail: ThumbnailConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            image_directory: PathBuf::from("./images"),
            database_path: PathBuf::from("./ims-release.db"),
            scanlator: "ims".into(),
            auth_token: None,
            max_upload_bytes: 32 * 1024 * 1024,
            thumbnail: ThumbnailConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read and validate a TOML config file. Missing keys take their
    /// default values.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.scanlator.trim().is_empty() {
            return Err(ServerError::Config("scanlator must not be empty".into()));
        }
        // the scanlator is embedded in "[...]" in archive names
        if self.scanlator.contains(['[', ']']) {
            return Err(ServerError::Config(format!(
                "scanlator {:?} must not contain brackets",
                self.scanlator
            )));
        }
        if self.thumbnail.max_width == 0 || self.thumbnail.max_height == 0 {
            return Err(ServerError::Config("thumbnail bounds must be non-zero".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ServerError::Config("max_upload_bytes must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.scanlator, "ims");
        assert_eq!(c.max_upload_bytes, 32 * 1024 * 1024);
        assert_eq!(c.thumbnail.max_width, 200);
        assert_eq!(c.thumbnail.max_height, 300);
        assert!(c.auth_token.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let c = ServerConfig::from_toml(
            r#"
            scanlator = "scans"
            auth_token = "secret"

            [thumbnail]
            max_width = 100
            max_height = 150
            "#,
        )
        .unwrap();
        assert_eq!(c.scanlator, "scans");
        assert_eq!(c.auth_token.as_deref(), Some("secret"));
        assert_eq!(c.thumbnail.max_width, 100);
        assert_eq!(c.image_directory, PathBuf::from("./images"));
    }

    #[test]
    fn toml_roundtrip() {
        let mut c = ServerConfig::default();
        c.auth_token = Some("t".into());
        let text = c.to_toml().unwrap();
        assert_eq!(ServerConfig::from_toml(&text).unwrap(), c);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut c = ServerConfig::default();
        c.scanlator = "a]b".into();
        assert!(matches!(c.validate(), Err(ServerError::Config(_))));

        let mut c = ServerConfig::default();
        c.scanlator = "  ".into();
        assert!(c.validate().is_err());

        let mut c = ServerConfig::default();
        c.thumbnail.max_height = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ims.toml");
        std::fs::write(&path, "bind_addr = \"0.0.0.0:9000\"\n").unwrap();
        let c = ServerConfig::load(&path).unwrap();
        assert_eq!(c.bind_addr.port(), 9000);

        assert!(ServerConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
