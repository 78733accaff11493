// Test utilities available to both unit and integration tests
// Only compiled when testing

use chrono::NaiveDate;

use crate::model::{Dataset, LabResult, RawCell, RawRow};
use crate::store::{MemoryStorage, SnapshotStorage, StorageError};
use crate::{COLUMN_DATE, COLUMN_EXAM_NAME, COLUMN_EXAM_TYPE, COLUMN_VALUE};

/// Parse a `YYYY-MM-DD` literal, panicking on typos in test data
#[allow(dead_code)]
pub fn ymd(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
}

#[allow(dead_code)]
pub fn lab_result(date: &str, exam_type: &str, exam_name: &str, value: f64) -> LabResult {
    LabResult::new(ymd(date), exam_type, exam_name, value)
}

/// A decoded row carrying the four required columns
#[allow(dead_code)]
pub fn exam_row(
    row_number: usize,
    date: impl Into<RawCell>,
    exam_type: &str,
    exam_name: &str,
    value: impl Into<RawCell>,
) -> RawRow {
    RawRow::new(row_number)
        .with(COLUMN_DATE, date)
        .with(COLUMN_EXAM_TYPE, exam_type)
        .with(COLUMN_EXAM_NAME, exam_name)
        .with(COLUMN_VALUE, value)
}

/// Semicolon separated upload with the required header, one line per `[Data, Tipo de exame, Exame, Valor]`
#[allow(dead_code)]
pub fn csv_upload(rows: &[[&str; 4]]) -> Vec<u8> {
    let mut csv = format!("{COLUMN_DATE};{COLUMN_EXAM_TYPE};{COLUMN_EXAM_NAME};{COLUMN_VALUE}\n");
    for row in rows {
        csv.push_str(&row.join(";"));
        csv.push('\n');
    }
    csv.into_bytes()
}

/// A small dataset covering two exam types and repeated measurements
#[allow(dead_code)]
pub fn create_sample_dataset() -> Dataset {
    Dataset::from_records(vec![
        lab_result("2024-01-10", "Hematologia", "Hemoglobina", 13.5),
        lab_result("2024-02-10", "Hematologia", "Hemoglobina", 14.0),
        lab_result("2024-01-10", "Hematologia", "Plaquetas", 250_000.0),
        lab_result("2023-11-05", "Bioquímica", "Glicose", 92.0),
        lab_result("2024-02-10", "Bioquímica", "Glicose", 88.5),
        lab_result("2024-02-10", "Bioquímica", "Ácido úrico", 5.2),
    ])
}

/// Memory storage that refuses every write, as a full or read-only disk would
#[derive(Debug, Clone, Default)]
pub struct ReadOnlyStorage {
    pub inner: MemoryStorage,
}

impl ReadOnlyStorage {
    /// Start from `snapshot` already sitting in `key`
    #[allow(dead_code)]
    pub fn holding(key: &str, snapshot: &str) -> Self {
        let mut inner = MemoryStorage::new();
        // MemoryStorage writes never fail
        let _ = inner.write(key, snapshot);
        ReadOnlyStorage { inner }
    }
}

impl SnapshotStorage for ReadOnlyStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io {
            path: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::StorageFull, "no space left"),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}
