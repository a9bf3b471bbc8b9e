//! Bulk generation of synthetic crop records in fixed-size batches.
//!
//! Every batch is committed on its own. A failure stops the run, and the
//! batches committed before it stay in the store.

use thiserror::Error;

use crate::db::{CropSession, Gateway, StoreError};
use crate::generator::CropGenerator;
use crate::logger::{error, info};

pub const MAX_BATCH_SIZE: usize = 10_000;

/// Magnitudes offered by the bulk-insert control.
pub const BULK_SIZES: [usize; 3] = [1_000, 10_000, 100_000];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Rows committed so far, this batch included.
    pub inserted: u64,
    pub total: u64,
    /// 1-based.
    pub batch: usize,
    pub batches: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkReport {
    pub inserted: u64,
    pub batches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bulk insert stopped after {inserted} of {total} records: {source}")]
pub struct BulkError {
    /// Rows committed before the failure. They are not rolled back.
    pub inserted: u64,
    pub total: u64,
    #[source]
    pub source: StoreError,
}

/// Sizes of the batches a request for `total` records is split into.
pub fn batch_sizes(total: usize) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }
    let batch_size = MAX_BATCH_SIZE.min(total);
    (0..total)
        .step_by(batch_size)
        .map(|offset| batch_size.min(total - offset))
        .collect()
}

/// Generate and insert `total` records over an already open session.
pub fn insert_bulk<S: CropSession + ?Sized>(
    session: &mut S,
    generator: &mut CropGenerator,
    total: usize,
    mut on_progress: impl FnMut(Progress),
) -> Result<BulkReport, BulkError> {
    let sizes = batch_sizes(total);
    let batches = sizes.len();
    let mut inserted = 0u64;

    for (i, size) in sizes.into_iter().enumerate() {
        let crops = generator.batch(size);
        match session.insert_many(&crops) {
            Ok(n) => inserted += n,
            Err(source) => {
                error(&format!(
                    "bulk: batch {}/{} failed after {} rows: {}",
                    i + 1,
                    batches,
                    inserted,
                    source
                ));
                return Err(BulkError {
                    inserted,
                    total: total as u64,
                    source,
                });
            }
        }
        on_progress(Progress {
            inserted,
            total: total as u64,
            batch: i + 1,
            batches,
        });
    }

    info(&format!("bulk: {} records inserted in {} batches", inserted, batches));
    Ok(BulkReport { inserted, batches })
}

/// Open one connection for the whole run, insert, then close it.
pub fn run(
    gateway: &Gateway,
    generator: &mut CropGenerator,
    total: usize,
    on_progress: impl FnMut(Progress),
) -> Result<BulkReport, BulkError> {
    let mut session = gateway.connect().map_err(|source| BulkError {
        inserted: 0,
        total: total as u64,
        source,
    })?;
    insert_bulk(session.as_mut(), generator, total, on_progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::crop::{CropRecord, NewCrop};
    use chrono::NaiveDate;

    /// Records batch sizes and fails the n-th `insert_many` call.
    #[derive(Default)]
    struct FakeSession {
        batches: Vec<usize>,
        rows: Vec<NewCrop>,
        fail_on: Option<usize>,
    }

    impl CropSession for FakeSession {
        fn ensure_schema(&mut self) -> Result<(), StoreError> {
            Ok(())
        }
        fn insert_many(&mut self, crops: &[NewCrop]) -> Result<u64, StoreError> {
            if self.fail_on == Some(self.batches.len() + 1) {
                return Err(StoreError::Insert("duplicate entry".into()));
            }
            self.batches.push(crops.len());
            self.rows.extend_from_slice(crops);
            Ok(crops.len() as u64)
        }
        fn fetch_all(&mut self) -> Result<Vec<CropRecord>, StoreError> {
            Ok(Vec::new())
        }
        fn count(&mut self) -> Result<u64, StoreError> {
            Ok(self.rows.len() as u64)
        }
    }

    fn generator() -> CropGenerator {
        CropGenerator::seeded(17, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
    }

    #[test]
    fn batch_sizes_follow_min_of_total_and_cap() {
        assert_eq!(batch_sizes(0), Vec::<usize>::new());
        assert_eq!(batch_sizes(1_000), vec![1_000]);
        assert_eq!(batch_sizes(10_000), vec![10_000]);
        assert_eq!(batch_sizes(25_000), vec![10_000, 10_000, 5_000]);
        assert_eq!(batch_sizes(100_000).len(), 10);
        for total in [1, 999, 10_001, 33_333] {
            let sizes = batch_sizes(total);
            assert_eq!(sizes.iter().sum::<usize>(), total);
            assert_eq!(sizes.len(), total.div_ceil(MAX_BATCH_SIZE.min(total)));
        }
    }

    #[test]
    fn reports_progress_after_every_batch() {
        let mut session = FakeSession::default();
        let mut seen = Vec::new();
        let report = insert_bulk(&mut session, &mut generator(), 25_000, |p| seen.push(p)).unwrap();

        assert_eq!(report, BulkReport { inserted: 25_000, batches: 3 });
        assert_eq!(session.batches, vec![10_000, 10_000, 5_000]);
        assert_eq!(session.count().unwrap(), 25_000);
        let cumulative: Vec<u64> = seen.iter().map(|p| p.inserted).collect();
        assert_eq!(cumulative, vec![10_000, 20_000, 25_000]);
        assert!(seen.iter().all(|p| p.total == 25_000 && p.batches == 3));
        assert_eq!(seen.last().map(|p| p.batch), Some(3));
    }

    #[test]
    fn failure_keeps_earlier_batches() {
        let mut session = FakeSession { fail_on: Some(3), ..Default::default() };
        let mut calls = 0;
        let err = insert_bulk(&mut session, &mut generator(), 35_000, |_| calls += 1).unwrap_err();

        assert_eq!(err.inserted, 20_000);
        assert_eq!(err.total, 35_000);
        assert!(matches!(err.source, StoreError::Insert(_)));
        assert_eq!(session.batches, vec![10_000, 10_000]);
        assert_eq!(session.rows.len(), 20_000);
        assert_eq!(calls, 2);
        assert!(err.to_string().starts_with("bulk insert stopped after 20000 of 35000 records"));
    }

    #[test]
    fn zero_records_is_a_no_op() {
        let mut session = FakeSession::default();
        let report = insert_bulk(&mut session, &mut generator(), 0, |_| panic!("no batches")).unwrap();
        assert_eq!(report, BulkReport { inserted: 0, batches: 0 });
        assert!(session.batches.is_empty());
    }

    #[test]
    fn run_against_sqlite_persists_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Gateway::new(Connection::sqlite(dir.path().join("bulk.db")));
        gateway.ensure_schema().unwrap();
        gateway.insert_one(&generator().next_crop()).unwrap();

        let mut batches = 0;
        let report = run(&gateway, &mut generator(), 25_000, |_| batches += 1).unwrap();
        assert_eq!(report.inserted, 25_000);
        assert_eq!(batches, 3);
        assert_eq!(gateway.connect().unwrap().count().unwrap(), 25_001);
    }

    #[test]
    fn run_reports_connection_failure_with_nothing_inserted() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Gateway::new(Connection::sqlite(dir.path().join("missing/dir/bulk.db")));
        let err = run(&gateway, &mut generator(), 1_000, |_| {}).unwrap_err();
        assert_eq!(err.inserted, 0);
        assert!(matches!(err.source, StoreError::Connection(_)));
    }
}
