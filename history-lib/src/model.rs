use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::datetime::iso_date;

/// One measurement of one exam on one collection date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabResult {
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub exam_type: String,
    pub exam_name: String,
    pub value: f64,
}

impl LabResult {
    pub fn new(
        date: NaiveDate,
        exam_type: impl Into<String>,
        exam_name: impl Into<String>,
        value: f64,
    ) -> Self {
        LabResult {
            date,
            exam_type: exam_type.into(),
            exam_name: exam_name.into(),
            value,
        }
    }

    /// True when the record satisfies the invariants every stored record must hold
    pub fn is_well_formed(&self) -> bool {
        !self.exam_type.trim().is_empty()
            && !self.exam_name.trim().is_empty()
            && self.value.is_finite()
    }
}

/// The session's lab results, always sorted ascending by date.
///
/// Every constructor sorts (stable), so code receiving a `&Dataset` can rely on
/// chronological order without checking it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<LabResult>,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset::default()
    }

    pub fn from_records(mut records: Vec<LabResult>) -> Self {
        // sort_by_key is stable: same-day records keep their relative order
        records.sort_by_key(|record| record.date);
        Dataset { records }
    }

    pub fn records(&self) -> &[LabResult] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabResult> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a LabResult;
    type IntoIter = std::slice::Iter<'a, LabResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A spreadsheet cell as handed over by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl RawCell {
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::Text(value.to_string())
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::Number(value)
    }
}

impl From<NaiveDate> for RawCell {
    fn from(value: NaiveDate) -> Self {
        RawCell::Date(value)
    }
}

/// One data row of the first sheet, keyed by header text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    /// 1-based row number in the sheet (the header is row 1)
    pub row_number: usize,
    pub cells: HashMap<String, RawCell>,
}

impl RawRow {
    pub fn new(row_number: usize) -> Self {
        RawRow {
            row_number,
            cells: HashMap::new(),
        }
    }

    pub fn with(mut self, header: &str, cell: impl Into<RawCell>) -> Self {
        self.cells.insert(header.to_string(), cell.into());
        self
    }

    pub fn insert(&mut self, header: String, cell: RawCell) {
        self.cells.insert(header, cell);
    }

    pub fn cell(&self, header: &str) -> Option<&RawCell> {
        self.cells.get(header)
    }
}
