mod mysql;
mod postgres;
mod sqlite;

use anyhow::Result;
use serde::Deserialize;
use thiserror::Error;

use crate::connection::Connection;
use crate::crop::{CropRecord, NewCrop};
use crate::logger::{debug, error};

pub use mysql::Mysql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "postgres")]
    Postgres,
    #[serde(rename = "sqlite")]
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store unreachable, credentials rejected or connection misconfigured.
    #[error("Error connecting to database: {0}")]
    Connection(String),
    #[error("Error inserting record: {0}")]
    Insert(String),
    #[error("Error reading records: {0}")]
    Query(String),
    #[error("Error creating table: {0}")]
    Schema(String),
}

impl StoreError {
    pub fn connection<E: std::fmt::Display>(e: E) -> Self {
        StoreError::Connection(e.to_string())
    }
    pub fn insert<E: std::fmt::Display>(e: E) -> Self {
        StoreError::Insert(e.to_string())
    }
    pub fn query<E: std::fmt::Display>(e: E) -> Self {
        StoreError::Query(e.to_string())
    }
    pub fn schema<E: std::fmt::Display>(e: E) -> Self {
        StoreError::Schema(e.to_string())
    }
}

/// An open connection to the backing store. Dropping it closes the
/// connection.
pub trait CropSession {
    fn ensure_schema(&mut self) -> Result<(), StoreError>;

    /// Insert all `crops` and commit. Either every row of the call is
    /// committed or none is.
    fn insert_many(&mut self, crops: &[NewCrop]) -> Result<u64, StoreError>;

    /// All rows ordered by id ascending.
    fn fetch_all(&mut self) -> Result<Vec<CropRecord>, StoreError>;

    fn count(&mut self) -> Result<u64, StoreError>;

    fn insert_one(&mut self, crop: &NewCrop) -> Result<(), StoreError> {
        self.insert_many(std::slice::from_ref(crop)).map(|_| ())
    }
}

pub trait Backend {
    /// Display form of the connection target. Passwords are masked.
    fn database_url(conn: &Connection) -> Result<String>;
    fn open(conn: &Connection) -> Result<Box<dyn CropSession>, StoreError>;
}

/// Entry point for every store operation. Each call opens its own session
/// and closes it before returning.
#[derive(Debug, Clone)]
pub struct Gateway {
    conn: Connection,
}

impl Gateway {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn database_url(conn: &Connection) -> Result<String> {
        match conn.r#type {
            DatabaseType::MySql => Mysql::database_url(conn),
            DatabaseType::Postgres => Postgres::database_url(conn),
            DatabaseType::Sqlite => Sqlite::database_url(conn),
        }
    }

    pub fn connect(&self) -> Result<Box<dyn CropSession>, StoreError> {
        debug(&format!("gateway: connecting to {}", self.conn.label()));
        let session = match self.conn.r#type {
            DatabaseType::MySql => Mysql::open(&self.conn),
            DatabaseType::Postgres => Postgres::open(&self.conn),
            DatabaseType::Sqlite => Sqlite::open(&self.conn),
        };
        if let Err(e) = &session {
            error(&format!("gateway: {}", e));
        }
        session
    }

    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.connect()?.ensure_schema().inspect_err(log_failure)
    }

    pub fn insert_one(&self, crop: &NewCrop) -> Result<(), StoreError> {
        let mut session = self.connect()?;
        session.insert_one(crop).inspect_err(log_failure)?;
        debug(&format!("gateway: inserted one {} record", crop.crop_name));
        Ok(())
    }

    pub fn try_fetch_all(&self) -> Result<Vec<CropRecord>, StoreError> {
        let rows = self.connect()?.fetch_all().inspect_err(log_failure)?;
        debug(&format!("gateway: fetched {} records", rows.len()));
        Ok(rows)
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        self.connect()?.count().inspect_err(log_failure)
    }

    /// Like [`Gateway::try_fetch_all`], but an unreachable or unreadable
    /// store yields no rows. The failure is logged.
    pub fn fetch_all(&self) -> Vec<CropRecord> {
        self.try_fetch_all().unwrap_or_default()
    }
}

fn log_failure(e: &StoreError) {
    error(&format!("gateway: {}", e));
}

pub(crate) const TABLE: &str = "crops";
pub(crate) const INSERT_COLUMNS: [&str; 6] = [
    "crop_name",
    "planting_date",
    "harvest_date",
    "growth_stage",
    "pest_control_measures",
    "yield_prediction",
];

/// `INSERT INTO crops (..) VALUES (..), (..)` for `rows` rows, numbering
/// placeholders through `placeholder` (0-based parameter index).
pub(crate) fn insert_sql(rows: usize, placeholder: impl Fn(usize) -> String) -> String {
    let width = INSERT_COLUMNS.len();
    let values = (0..rows)
        .map(|r| {
            let cells = (0..width)
                .map(|c| placeholder(r * width + c))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({})", cells)
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        TABLE,
        INSERT_COLUMNS.join(", "),
        values
    )
}

/// Rows that fit in one statement under a bind-parameter limit.
pub(crate) fn rows_per_statement(max_params: usize) -> usize {
    (max_params / INSERT_COLUMNS.len()).max(1)
}

pub(crate) fn masked(password: &Option<String>) -> &'static str {
    match password {
        Some(p) if !p.is_empty() => ":***",
        _ => "",
    }
}
