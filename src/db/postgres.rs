use std::time::Duration;

use anyhow::Result;
use postgres::types::ToSql;

use crate::connection::Connection;
use crate::crop::{CropRecord, NewCrop};
use crate::db::{insert_sql, masked, rows_per_statement, Backend, CropSession, StoreError};
use crate::logger::debug;

const DEFAULT_PORT: u16 = 5432;
const MAX_PARAMS: usize = 65_535;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS crops (
    id BIGSERIAL PRIMARY KEY,
    crop_name TEXT NOT NULL,
    planting_date DATE NOT NULL,
    harvest_date DATE NOT NULL,
    growth_stage TEXT NOT NULL,
    pest_control_measures TEXT NOT NULL,
    yield_prediction INTEGER NOT NULL
)";

const SELECT_ALL: &str = "SELECT id, crop_name, planting_date, harvest_date, growth_stage, \
    pest_control_measures, yield_prediction FROM crops ORDER BY id ASC";

pub struct Postgres {}

impl Backend for Postgres {
    fn database_url(conn: &Connection) -> Result<String> {
        let user = conn
            .user
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("type postgres needs the user field"))?;
        let host = conn
            .host
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("type postgres needs the host field"))?;
        let port = port(conn)?;

        Ok(format!(
            "postgres://{user}{password}@{host}:{port}/{database}",
            user = user,
            password = masked(&conn.password),
            host = host,
            port = port,
            database = conn.database.as_deref().unwrap_or_default(),
        ))
    }

    fn open(conn: &Connection) -> Result<Box<dyn CropSession>, StoreError> {
        Postgres::database_url(conn).map_err(StoreError::connection)?;
        let mut config = postgres::Config::new();
        config
            .host(conn.host.as_deref().unwrap_or_default())
            .port(port(conn).map_err(StoreError::connection)?)
            .user(conn.user.as_deref().unwrap_or_default())
            .connect_timeout(Duration::from_secs(5));
        if let Some(password) = &conn.password {
            config.password(password);
        }
        if let Some(database) = &conn.database {
            config.dbname(database);
        }
        let client = config
            .connect(postgres::NoTls)
            .map_err(StoreError::connection)?;
        debug("postgres: connected");
        Ok(Box::new(PostgresSession { client }))
    }
}

fn port(conn: &Connection) -> Result<u16> {
    match conn.port {
        Some(p) => Ok(u16::try_from(p)?),
        None => Ok(DEFAULT_PORT),
    }
}

pub struct PostgresSession {
    client: postgres::Client,
}

impl CropSession for PostgresSession {
    fn ensure_schema(&mut self) -> Result<(), StoreError> {
        self.client
            .batch_execute(CREATE_TABLE)
            .map_err(StoreError::schema)
    }

    fn insert_many(&mut self, crops: &[NewCrop]) -> Result<u64, StoreError> {
        // INTEGER column; reject what would not fit instead of wrapping
        let yields = crops
            .iter()
            .map(|c| i32::try_from(c.yield_prediction))
            .collect::<Result<Vec<i32>, _>>()
            .map_err(|_| StoreError::Insert("yield prediction out of range".to_string()))?;

        let mut tx = self.client.transaction().map_err(StoreError::insert)?;
        let per_statement = rows_per_statement(MAX_PARAMS);
        for (chunk, chunk_yields) in crops.chunks(per_statement).zip(yields.chunks(per_statement)) {
            let sql = insert_sql(chunk.len(), |i| format!("${}", i + 1));
            let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(chunk.len() * 6);
            for (c, y) in chunk.iter().zip(chunk_yields) {
                params.push(&c.crop_name);
                params.push(&c.planting_date);
                params.push(&c.harvest_date);
                params.push(&c.growth_stage);
                params.push(&c.pest_control_measures);
                params.push(y);
            }
            tx.execute(sql.as_str(), &params)
                .map_err(StoreError::insert)?;
        }
        tx.commit().map_err(StoreError::insert)?;
        Ok(crops.len() as u64)
    }

    fn fetch_all(&mut self) -> Result<Vec<CropRecord>, StoreError> {
        let rows = self
            .client
            .query(SELECT_ALL, &[])
            .map_err(StoreError::query)?;
        let mut records = Vec::with_capacity(rows.len());
        for r in rows {
            let yield_prediction: i32 = r.try_get(6).map_err(StoreError::query)?;
            records.push(CropRecord {
                id: r.try_get(0).map_err(StoreError::query)?,
                crop: NewCrop {
                    crop_name: r.try_get(1).map_err(StoreError::query)?,
                    planting_date: r.try_get(2).map_err(StoreError::query)?,
                    harvest_date: r.try_get(3).map_err(StoreError::query)?,
                    growth_stage: r.try_get(4).map_err(StoreError::query)?,
                    pest_control_measures: r.try_get(5).map_err(StoreError::query)?,
                    yield_prediction: u32::try_from(yield_prediction)
                        .map_err(StoreError::query)?,
                },
            });
        }
        Ok(records)
    }

    fn count(&mut self) -> Result<u64, StoreError> {
        let row = self
            .client
            .query_one("SELECT COUNT(*) FROM crops", &[])
            .map_err(StoreError::query)?;
        let n: i64 = row.try_get(0).map_err(StoreError::query)?;
        Ok(n.max(0) as u64)
    }
}
