use crate::crop::CropRecord;
use crate::db::Gateway;

/// What the record table shows. Always rebuilt from the store, never
/// patched in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewModel {
    pub records: Vec<CropRecord>,
    /// Set when the store could not be read; `records` is then empty.
    pub error: Option<String>,
}

impl ViewModel {
    pub fn reload(gateway: &Gateway) -> Self {
        match gateway.try_fetch_all() {
            Ok(records) => Self { records, error: None },
            Err(e) => Self {
                records: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::generator::CropGenerator;

    #[test]
    fn reload_reflects_store_contents() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Gateway::new(Connection::sqlite(dir.path().join("view.db")));
        gateway.ensure_schema().unwrap();
        let empty = ViewModel::reload(&gateway);
        assert!(empty.is_empty());
        assert_eq!(empty.error, None);

        let crop = CropGenerator::new().next_crop();
        gateway.insert_one(&crop).unwrap();
        let view = ViewModel::reload(&gateway);
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.records[0].crop, crop);
    }

    #[test]
    fn unreachable_store_gives_empty_view_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Gateway::new(Connection::sqlite(dir.path().join("gone/view.db")));
        let view = ViewModel::reload(&gateway);
        assert!(view.is_empty());
        assert!(view
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Error connecting to database")));
    }
}
