//! Upload lifecycle of one user session.
//!
//! Reading the uploaded file is the one step that may complete later, so an
//! upload is split in two: [`Session::begin_upload`] marks the session as
//! loading (further uploads are refused until it finishes) and
//! [`Session::complete_upload`] receives the bytes, runs the pipeline and
//! applies the failure policy:
//!
//! | failure            | dataset and snapshot |
//! |--------------------|----------------------|
//! | read error         | unchanged            |
//! | decode error       | unchanged            |
//! | no valid rows      | cleared              |
//! | snapshot write     | unchanged            |
//!
//! Every outcome leaves the loading state.

use log::{info, warn};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::decoder::{DecodeError, SpreadsheetDecoder};
use crate::model::Dataset;
use crate::normalizer::{DroppedRow, NormalizeError, RecordNormalizer};
use crate::store::{DatasetStore, SnapshotStorage, StorageError};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Falha ao ler o arquivo.")]
    Read {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    NoValidRows(#[from] NormalizeError),

    #[error("Um arquivo já está sendo carregado. Aguarde a conclusão.")]
    UploadInProgress,

    #[error("O carregamento de '{0}' não é o carregamento em andamento.")]
    UnknownTicket(String),

    #[error(transparent)]
    Persist(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Loading {
        file_name: String,
    },
    Loaded {
        file_name: String,
    },
    Failed {
        file_name: String,
        message: String,
    },
}

/// Source of session identities, unique within the process
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(0);

/// Proof that an upload was started; consumed when the upload completes.
/// Only the session that issued it accepts it.
#[derive(Debug)]
pub struct UploadTicket {
    session_id: u64,
    id: u64,
    file_name: String,
}

impl UploadTicket {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadSummary {
    pub file_name: String,
    /// Records now in the dataset
    pub records: usize,
    /// Rows ignored because a required column was missing or invalid
    pub dropped: Vec<DroppedRow>,
}

#[derive(Debug)]
pub struct Session<S: SnapshotStorage> {
    id: u64,
    store: DatasetStore<S>,
    state: UploadState,
    loading_ticket: Option<u64>,
    next_ticket: u64,
}

impl<S: SnapshotStorage> Session<S> {
    /// Open a session over `storage`, restoring the persisted dataset if any
    pub fn start(storage: S) -> Self {
        let mut store = DatasetStore::new(storage);
        store.restore();
        Session {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            store,
            state: UploadState::Idle,
            loading_ticket: None,
            next_ticket: 0,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        self.store.dataset()
    }

    pub fn store(&self) -> &DatasetStore<S> {
        &self.store
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading_ticket.is_some()
    }

    pub fn begin_upload(&mut self, file_name: &str) -> Result<UploadTicket, IngestError> {
        if self.is_loading() {
            return Err(IngestError::UploadInProgress);
        }

        let id = self.next_ticket;
        self.next_ticket += 1;
        self.loading_ticket = Some(id);
        self.state = UploadState::Loading {
            file_name: file_name.to_string(),
        };

        Ok(UploadTicket {
            session_id: self.id,
            id,
            file_name: file_name.to_string(),
        })
    }

    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        bytes: std::io::Result<Vec<u8>>,
    ) -> Result<UploadSummary, IngestError> {
        if ticket.session_id != self.id || self.loading_ticket != Some(ticket.id) {
            return Err(IngestError::UnknownTicket(ticket.file_name));
        }

        let result = self.ingest(&ticket.file_name, bytes);
        self.loading_ticket = None;

        self.state = match &result {
            Ok(summary) => {
                info!(
                    "loaded {} lab results from '{}' ({} rows ignored)",
                    summary.records,
                    summary.file_name,
                    summary.dropped.len()
                );
                UploadState::Loaded {
                    file_name: ticket.file_name,
                }
            }
            Err(e) => {
                warn!("upload of '{}' failed: {}", ticket.file_name, e);
                UploadState::Failed {
                    file_name: ticket.file_name,
                    message: e.to_string(),
                }
            }
        };

        result
    }

    /// Read a file from disk and upload it
    pub fn upload_file(&mut self, path: &Path) -> Result<UploadSummary, IngestError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let ticket = self.begin_upload(&file_name)?;
        let bytes = std::fs::read(path);
        self.complete_upload(ticket, bytes)
    }

    /// Forget the dataset and its persisted snapshot
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.state = UploadState::Idle;
        self.store.clear()
    }

    fn ingest(
        &mut self,
        file_name: &str,
        bytes: std::io::Result<Vec<u8>>,
    ) -> Result<UploadSummary, IngestError> {
        let bytes = bytes.map_err(|source| IngestError::Read {
            file_name: file_name.to_string(),
            source,
        })?;

        let rows = SpreadsheetDecoder::decode_with_hint(&bytes, file_name)?;

        let batch = match RecordNormalizer::normalize(&rows) {
            Ok(batch) => batch,
            Err(e) => {
                // Do not keep showing data that no longer matches the last upload
                if let Err(clear_error) = self.store.clear() {
                    warn!("failed to clear dataset after invalid upload: {clear_error}");
                }
                return Err(e.into());
            }
        };

        let records = batch.dataset.len();
        self.store.replace(batch.dataset)?;

        Ok(UploadSummary {
            file_name: file_name.to_string(),
            records,
            dropped: batch.dropped,
        })
    }
}
