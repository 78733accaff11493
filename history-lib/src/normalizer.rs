use chrono::NaiveDate;
use log::debug;
use std::fmt;
use thiserror::Error;

use crate::model::{Dataset, LabResult, RawCell, RawRow};
use crate::utils::parse_date_string;
use crate::{COLUMN_DATE, COLUMN_EXAM_NAME, COLUMN_EXAM_TYPE, COLUMN_VALUE};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error(
        "Nenhum dado válido encontrado no arquivo. Verifique as colunas 'Data', 'Tipo de exame', 'Exame' e 'Valor'."
    )]
    NoValidRows { rows_read: usize },
}

/// Why a row did not make it into the dataset
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    InvalidDate,
    MissingExamType,
    MissingExamName,
    InvalidValue,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let column = match self {
            DropReason::InvalidDate => COLUMN_DATE,
            DropReason::MissingExamType => COLUMN_EXAM_TYPE,
            DropReason::MissingExamName => COLUMN_EXAM_NAME,
            DropReason::InvalidValue => COLUMN_VALUE,
        };
        write!(f, "invalid or missing '{column}'")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRow {
    pub row_number: usize,
    pub reason: DropReason,
}

/// Outcome of a successful normalization
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBatch {
    pub dataset: Dataset,
    pub dropped: Vec<DroppedRow>,
}

/// Maps decoded rows to validated `LabResult` records.
///
/// Invalid rows are dropped silently (only counted); a batch where nothing
/// survives is an error so that a bad upload never replaces good data with
/// an empty dataset.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordNormalizer;

impl RecordNormalizer {
    pub fn normalize(rows: &[RawRow]) -> Result<NormalizedBatch, NormalizeError> {
        let mut records = Vec::with_capacity(rows.len());
        let mut dropped = Vec::new();

        for row in rows {
            match Self::normalize_row(row) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    debug!("dropping row {}: {}", row.row_number, reason);
                    dropped.push(DroppedRow {
                        row_number: row.row_number,
                        reason,
                    });
                }
            }
        }

        if records.is_empty() {
            return Err(NormalizeError::NoValidRows {
                rows_read: rows.len(),
            });
        }

        Ok(NormalizedBatch {
            dataset: Dataset::from_records(records),
            dropped,
        })
    }

    pub fn normalize_row(row: &RawRow) -> Result<LabResult, DropReason> {
        let date = row
            .cell(COLUMN_DATE)
            .and_then(Self::parse_date)
            .ok_or(DropReason::InvalidDate)?;
        let exam_type = row
            .cell(COLUMN_EXAM_TYPE)
            .and_then(Self::parse_label)
            .ok_or(DropReason::MissingExamType)?;
        let exam_name = row
            .cell(COLUMN_EXAM_NAME)
            .and_then(Self::parse_label)
            .ok_or(DropReason::MissingExamName)?;
        let value = row
            .cell(COLUMN_VALUE)
            .and_then(Self::parse_value)
            .ok_or(DropReason::InvalidValue)?;

        Ok(LabResult {
            date,
            exam_type,
            exam_name,
            value,
        })
    }

    pub fn parse_date(cell: &RawCell) -> Option<NaiveDate> {
        match cell {
            RawCell::Date(date) => Some(*date),
            RawCell::Text(text) => parse_date_string(text),
            RawCell::Number(_) | RawCell::Empty => None,
        }
    }

    /// Measurement value; textual cells accept the Brazilian decimal comma
    pub fn parse_value(cell: &RawCell) -> Option<f64> {
        let value = match cell {
            RawCell::Number(number) => *number,
            RawCell::Text(text) => parse_leading_float(&text.replacen(',', ".", 1))?,
            RawCell::Date(_) | RawCell::Empty => return None,
        };
        value.is_finite().then_some(value)
    }

    fn parse_label(cell: &RawCell) -> Option<String> {
        match cell {
            RawCell::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            RawCell::Number(number) if number.is_finite() => Some(number.to_string()),
            _ => None,
        }
    }
}

/// Parse the longest floating-point literal at the start of `s`, ignoring
/// leading whitespace and any trailing text ("13.5 g/dL" -> 13.5).
///
/// Only plain decimal notation with an optional exponent is accepted; words
/// such as "NaN" or "inf" are not numbers here.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
