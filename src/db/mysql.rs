use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use mysql::prelude::{FromValue, Queryable};
use mysql::{from_value_opt, Conn, OptsBuilder, Params, TxOpts, Value};

use crate::connection::Connection;
use crate::crop::{parse_date, CropRecord, NewCrop};
use crate::db::{insert_sql, masked, rows_per_statement, Backend, CropSession, StoreError};
use crate::logger::debug;

const DEFAULT_PORT: u16 = 3306;
const MAX_PARAMS: usize = 65_535;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS crops (
    id INT AUTO_INCREMENT PRIMARY KEY,
    crop_name VARCHAR(255) NOT NULL,
    planting_date DATE NOT NULL,
    harvest_date DATE NOT NULL,
    growth_stage VARCHAR(255) NOT NULL,
    pest_control_measures VARCHAR(255) NOT NULL,
    yield_prediction INT NOT NULL
)";

// Dates travel as text so the client needs no date feature.
const SELECT_ALL: &str = "SELECT id, crop_name, DATE_FORMAT(planting_date, '%Y-%m-%d'), \
    DATE_FORMAT(harvest_date, '%Y-%m-%d'), growth_stage, pest_control_measures, yield_prediction \
    FROM crops ORDER BY id ASC";

pub struct Mysql {}

impl Backend for Mysql {
    fn database_url(conn: &Connection) -> Result<String> {
        let user = conn
            .user
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("type mysql needs the user field"))?;
        let host = conn
            .host
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("type mysql needs the host field"))?;
        let port = port(conn)?;

        Ok(format!(
            "mysql://{user}{password}@{host}:{port}/{database}",
            user = user,
            password = masked(&conn.password),
            host = host,
            port = port,
            database = conn.database.as_deref().unwrap_or_default(),
        ))
    }

    fn open(conn: &Connection) -> Result<Box<dyn CropSession>, StoreError> {
        // validates the required fields before touching the network
        Mysql::database_url(conn).map_err(StoreError::connection)?;
        let opts = OptsBuilder::new()
            .ip_or_hostname(conn.host.clone())
            .tcp_port(port(conn).map_err(StoreError::connection)?)
            .user(conn.user.clone())
            .pass(conn.password.clone())
            .db_name(conn.database.clone())
            .tcp_connect_timeout(Some(Duration::from_secs(5)));
        let conn = Conn::new(opts).map_err(StoreError::connection)?;
        debug("mysql: connected");
        Ok(Box::new(MysqlSession { conn }))
    }
}

fn port(conn: &Connection) -> Result<u16> {
    match conn.port {
        Some(p) => Ok(u16::try_from(p)?),
        None => Ok(DEFAULT_PORT),
    }
}

pub struct MysqlSession {
    conn: Conn,
}

impl CropSession for MysqlSession {
    fn ensure_schema(&mut self) -> Result<(), StoreError> {
        self.conn.query_drop(CREATE_TABLE).map_err(StoreError::schema)
    }

    fn insert_many(&mut self, crops: &[NewCrop]) -> Result<u64, StoreError> {
        let mut tx = self
            .conn
            .start_transaction(TxOpts::default())
            .map_err(StoreError::insert)?;
        for chunk in crops.chunks(rows_per_statement(MAX_PARAMS)) {
            let sql = insert_sql(chunk.len(), |_| "?".to_string());
            let mut params: Vec<Value> = Vec::with_capacity(chunk.len() * 6);
            for c in chunk {
                params.push(Value::from(c.crop_name.clone()));
                params.push(Value::from(c.planting_date.format("%Y-%m-%d").to_string()));
                params.push(Value::from(c.harvest_date.format("%Y-%m-%d").to_string()));
                params.push(Value::from(c.growth_stage.clone()));
                params.push(Value::from(c.pest_control_measures.clone()));
                params.push(Value::from(c.yield_prediction));
            }
            tx.exec_drop(sql, Params::Positional(params))
                .map_err(StoreError::insert)?;
        }
        tx.commit().map_err(StoreError::insert)?;
        Ok(crops.len() as u64)
    }

    fn fetch_all(&mut self) -> Result<Vec<CropRecord>, StoreError> {
        // Untyped rows: typed `FromRow` conversion panics on NULLs or out-of-range values.
        let rows: Vec<mysql::Row> = self.conn.query(SELECT_ALL).map_err(StoreError::query)?;
        rows.into_iter()
            // `Row::unwrap` hands over the cell values; it cannot fail.
            .map(|row| crop_from_values(row.unwrap()))
            .collect()
    }

    fn count(&mut self) -> Result<u64, StoreError> {
        let row: Option<mysql::Row> = self
            .conn
            .query_first("SELECT COUNT(*) FROM crops")
            .map_err(StoreError::query)?;
        match row.and_then(|r| r.unwrap().into_iter().next()) {
            Some(value) => column(value, "count"),
            None => Ok(0),
        }
    }
}

fn column<T: FromValue>(value: Value, name: &str) -> Result<T, StoreError> {
    from_value_opt(value).map_err(|e| StoreError::Query(format!("column {}: {}", name, e)))
}

fn date_column(value: Value, name: &str) -> Result<NaiveDate, StoreError> {
    let text: String = column(value, name)?;
    parse_date(&text).map_err(|e| StoreError::Query(format!("column {}: {}", name, e)))
}

fn crop_from_values(values: Vec<Value>) -> Result<CropRecord, StoreError> {
    let [id, crop_name, planting, harvest, growth_stage, pest, yield_prediction]: [Value; 7] =
        values.try_into().map_err(|v: Vec<Value>| {
            StoreError::Query(format!("expected 7 columns, got {}", v.len()))
        })?;
    Ok(CropRecord {
        id: column(id, "id")?,
        crop: NewCrop {
            crop_name: column(crop_name, "crop_name")?,
            planting_date: date_column(planting, "planting_date")?,
            harvest_date: date_column(harvest, "harvest_date")?,
            growth_stage: column(growth_stage, "growth_stage")?,
            pest_control_measures: column(pest, "pest_control_measures")?,
            yield_prediction: column(yield_prediction, "yield_prediction")?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(growth_stage: Value, yield_prediction: Value) -> Vec<Value> {
        // text protocol: every cell arrives as bytes
        vec![
            Value::Bytes(b"7".to_vec()),
            Value::Bytes(b"Rice".to_vec()),
            Value::Bytes(b"2025-03-01".to_vec()),
            Value::Bytes(b"2025-07-10".to_vec()),
            growth_stage,
            Value::Bytes(b"Crop rotation".to_vec()),
            yield_prediction,
        ]
    }

    #[test]
    fn converts_text_row() {
        let record = crop_from_values(row(
            Value::Bytes(b"Flowering".to_vec()),
            Value::Bytes(b"1800".to_vec()),
        ))
        .unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.crop.crop_name, "Rice");
        assert_eq!(record.crop.harvest_date, NaiveDate::from_ymd_opt(2025, 7, 10).unwrap());
        assert_eq!(record.crop.growth_stage, "Flowering");
        assert_eq!(record.crop.yield_prediction, 1800);
    }

    #[test]
    fn bad_cells_are_query_errors() {
        let null_stage = crop_from_values(row(Value::NULL, Value::Int(900))).unwrap_err();
        assert!(matches!(&null_stage, StoreError::Query(m) if m.contains("growth_stage")));

        let negative = crop_from_values(row(Value::Bytes(b"Seedling".to_vec()), Value::Int(-5)))
            .unwrap_err();
        assert!(matches!(&negative, StoreError::Query(m) if m.contains("yield_prediction")));

        let mut bad_date = row(Value::Bytes(b"Seedling".to_vec()), Value::Int(900));
        bad_date[2] = Value::Bytes(b"01/03/2025".to_vec());
        assert!(matches!(crop_from_values(bad_date), Err(StoreError::Query(_))));

        assert!(matches!(crop_from_values(Vec::new()), Err(StoreError::Query(_))));
    }
}
