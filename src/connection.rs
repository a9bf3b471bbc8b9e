use serde::Deserialize;

use crate::db::{DatabaseType, Gateway};

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Connection {
    pub r#type: DatabaseType,
    pub name: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u64>,
    pub path: Option<std::path::PathBuf>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl Connection {
    pub fn sqlite(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            r#type: DatabaseType::Sqlite,
            name: None,
            user: None,
            host: None,
            port: None,
            path: Some(path.into()),
            password: None,
            database: None,
        }
    }

    /// Name shown in the connection list and dashboard title.
    pub fn label(&self) -> String {
        let url = Gateway::database_url(self).unwrap_or("invalid config".to_string());
        match &self.name {
            Some(name) => format!("{} ({})", name, url),
            None => url,
        }
    }
}
