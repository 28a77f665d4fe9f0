use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use taxo_types::Language;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding one `<version-hash>.json` snapshot per version.
    pub snapshot_root: PathBuf,
    /// Language used when a request does not name one.
    pub default_language: Language,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 9419)),
            snapshot_root: PathBuf::from("./snapshots"),
            default_language: Language::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:9419".parse::<SocketAddr>().unwrap());
        assert_eq!(c.snapshot_root, PathBuf::from("./snapshots"));
        assert_eq!(c.default_language.as_str(), "nb");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(r#"snapshot_root = "/srv/taxonomy""#).unwrap();
        assert_eq!(c.snapshot_root, PathBuf::from("/srv/taxonomy"));
        assert_eq!(c.bind_addr, ServerConfig::default().bind_addr);
    }

    #[test]
    fn full_toml() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:8080"
            snapshot_root = "data"
            default_language = "en"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.default_language.as_str(), "en");
    }

    #[test]
    fn invalid_language_rejected() {
        let err = ServerConfig::from_toml_str(r#"default_language = "English""#).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxo.toml");
        std::fs::write(&path, "bind_addr = \"127.0.0.1:7000\"\n").unwrap();
        assert_eq!(ServerConfig::load(&path).unwrap().bind_addr.port(), 7000);
    }
}
