#![allow(clippy::needless_return)]

pub mod decoder;
pub mod model;
pub mod normalizer;
pub mod series;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod utils;

// Test utilities - only compiled when testing or with test feature
// #[cfg(test)] alone doesn't work for integration tests (they're external crates)
// The feature flag makes it available to integration tests via dev-dependencies
#[cfg(any(test, feature = "test"))]
pub mod test_utils;

pub use decoder::{DecodeError, SpreadsheetDecoder};
pub use model::{Dataset, LabResult, RawCell, RawRow};
pub use normalizer::{DroppedRow, NormalizeError, NormalizedBatch, RecordNormalizer};
pub use series::{AxisDomain, SeriesPoint, SeriesProjection};
pub use session::{IngestError, Session, UploadState, UploadSummary, UploadTicket};
pub use snapshot::{ExamGroup, LatestSnapshot};
pub use store::{DatasetStore, FileStorage, MemoryStorage, SnapshotStorage, StorageError};

/// Name of the persisted snapshot slot
pub const SNAPSHOT_KEY: &str = "labResultsData";

pub const ERRORS_LOG_FILE: &str = "errors.log";

/// Column headers the first sheet must carry (exact match, case-sensitive)
pub const COLUMN_DATE: &str = "Data";
pub const COLUMN_EXAM_TYPE: &str = "Tipo de exame";
pub const COLUMN_EXAM_NAME: &str = "Exame";
pub const COLUMN_VALUE: &str = "Valor";
