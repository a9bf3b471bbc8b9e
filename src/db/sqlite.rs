use std::path::{Path, PathBuf};

use anyhow::Result;
use rusqlite::{params, OpenFlags};

use crate::connection::Connection;
use crate::crop::{CropRecord, NewCrop};
use crate::db::{insert_sql, Backend, CropSession, StoreError};
use crate::logger::debug;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS crops (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    crop_name TEXT NOT NULL,
    planting_date DATE NOT NULL,
    harvest_date DATE NOT NULL,
    growth_stage TEXT NOT NULL,
    pest_control_measures TEXT NOT NULL,
    yield_prediction INTEGER NOT NULL
)";

const SELECT_ALL: &str = "SELECT id, crop_name, planting_date, harvest_date, growth_stage, \
    pest_control_measures, yield_prediction FROM crops ORDER BY id ASC";

pub struct Sqlite {}

impl Backend for Sqlite {
    fn database_url(conn: &Connection) -> Result<String> {
        let path = sqlite_path(conn)?;
        Ok(format!("sqlite://{path}", path = path.display()))
    }

    fn open(conn: &Connection) -> Result<Box<dyn CropSession>, StoreError> {
        let path = sqlite_path(conn).map_err(StoreError::connection)?;
        debug(&format!("sqlite: opening {}", path.display()));
        let conn = rusqlite::Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(StoreError::connection)?;
        debug("sqlite: opened");
        Ok(Box::new(SqliteSession { conn }))
    }
}

fn sqlite_path(conn: &Connection) -> Result<PathBuf> {
    conn.path.as_ref().map_or(
        Err(anyhow::anyhow!("type sqlite needs the path field")),
        |path| expand_path(path).ok_or_else(|| anyhow::anyhow!("cannot expand file path")),
    )
}

pub struct SqliteSession {
    conn: rusqlite::Connection,
}

impl CropSession for SqliteSession {
    fn ensure_schema(&mut self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(CREATE_TABLE)
            .map_err(StoreError::schema)
    }

    // One prepared statement inside one transaction. Embedded, so there is
    // no round trip to save by building multi-row VALUES lists.
    fn insert_many(&mut self, crops: &[NewCrop]) -> Result<u64, StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::insert)?;
        {
            let sql = insert_sql(1, |_| "?".to_string());
            let mut stmt = tx.prepare(&sql).map_err(StoreError::insert)?;
            for c in crops {
                stmt.execute(params![
                    c.crop_name,
                    c.planting_date,
                    c.harvest_date,
                    c.growth_stage,
                    c.pest_control_measures,
                    c.yield_prediction,
                ])
                .map_err(StoreError::insert)?;
            }
        }
        tx.commit().map_err(StoreError::insert)?;
        Ok(crops.len() as u64)
    }

    fn fetch_all(&mut self) -> Result<Vec<CropRecord>, StoreError> {
        let mut stmt = self.conn.prepare(SELECT_ALL).map_err(StoreError::query)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CropRecord {
                    id: row.get(0)?,
                    crop: NewCrop {
                        crop_name: row.get(1)?,
                        planting_date: row.get(2)?,
                        harvest_date: row.get(3)?,
                        growth_stage: row.get(4)?,
                        pest_control_measures: row.get(5)?,
                        yield_prediction: row.get(6)?,
                    },
                })
            })
            .map_err(StoreError::query)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::query)
    }

    fn count(&mut self) -> Result<u64, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM crops", [], |row| row.get(0))
            .map_err(StoreError::query)?;
        Ok(n.max(0) as u64)
    }
}

fn expand_path(path: &Path) -> Option<PathBuf> {
    let mut expanded_path = PathBuf::new();
    let mut path_iter = path.iter();
    if path.starts_with("~") {
        path_iter.next()?;
        expanded_path = expanded_path.join(dirs_next::home_dir()?);
    }
    for path in path_iter {
        let path = path.to_str()?;
        expanded_path = if cfg!(unix) && path.starts_with('$') {
            expanded_path.join(std::env::var(path.strip_prefix('$')?).unwrap_or_default())
        } else if cfg!(windows) && path.starts_with('%') && path.ends_with('%') {
            expanded_path
                .join(std::env::var(path.strip_prefix('%')?.strip_suffix('%')?).unwrap_or_default())
        } else {
            expanded_path.join(path)
        }
    }
    Some(expanded_path)
}
