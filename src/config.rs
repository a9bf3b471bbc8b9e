use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::connection::Connection;

const APP_NAME: &str = "cropdbm";
const CONFIG_FILE: &str = "config.yaml";

/// Startup configuration. Everything the program needs to reach a store
/// comes from here; nothing is hard-coded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub conn: Vec<Connection>,
}

impl Config {
    /// Return the application config directory path, creating it if missing.
    pub fn app_config_dir() -> Result<PathBuf> {
        let mut path = if cfg!(target_os = "macos") {
            dirs_next::home_dir().map(|h| h.join(".config"))
        } else {
            dirs_next::config_dir()
        }
        .ok_or_else(|| anyhow::anyhow!("failed to find os config dir."))?;

        path.push(APP_NAME);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::app_config_dir()?.join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml(&data).with_context(|| format!("failed to parse YAML at {}", path.display()))
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(data)?)
    }

    /// Pick a connection by name, or the first configured one.
    pub fn select(&self, name: Option<&str>) -> Result<&Connection> {
        match name {
            Some(name) => self
                .conn
                .iter()
                .find(|c| c.name.as_deref() == Some(name))
                .ok_or_else(|| anyhow::anyhow!("no connection named '{}' in config", name)),
            None => self
                .conn
                .first()
                .ok_or_else(|| anyhow::anyhow!("no connections configured")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseType;

    const SAMPLE: &str = r#"
conn:
  - type: mysql
    name: farm
    host: localhost
    user: root
    password: password
    database: crop_management
  - type: postgres
    name: reporting
    host: db.internal
    port: 5433
    user: crops
    database: crops
  - type: sqlite
    name: local
    path: ~/crops.db
"#;

    #[test]
    fn parses_all_backends() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.conn.len(), 3);
        assert_eq!(config.conn[0].r#type, DatabaseType::MySql);
        assert_eq!(config.conn[0].database.as_deref(), Some("crop_management"));
        assert_eq!(config.conn[1].port, Some(5433));
        assert_eq!(config.conn[2].r#type, DatabaseType::Sqlite);
    }

    #[test]
    fn select_by_name_or_first() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.select(None).unwrap().name.as_deref(), Some("farm"));
        assert_eq!(
            config.select(Some("local")).unwrap().r#type,
            DatabaseType::Sqlite
        );
        assert!(config.select(Some("missing")).is_err());
    }

    #[test]
    fn missing_or_empty_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(Config::load(Some(&missing)).unwrap().conn.is_empty());

        let empty = dir.path().join("empty.yaml");
        fs::write(&empty, "").unwrap();
        assert!(Config::load(Some(&empty)).unwrap().conn.is_empty());
        assert!(Config::default().select(None).is_err());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = Config::from_yaml("conn:\n  - type: oracle\n").unwrap_err();
        assert!(err.to_string().contains("oracle"));
    }
}
