//! Latest result per exam, grouped by exam type.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::model::{Dataset, LabResult};
use crate::utils::locale_compare;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamGroup {
    pub exam_type: String,
    /// Most recent record of each exam in this group, ordered by exam name
    pub entries: Vec<LabResult>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct LatestSnapshot {
    groups: Vec<ExamGroup>,
}

impl LatestSnapshot {
    /// Build the snapshot in one pass over the date-sorted dataset.
    ///
    /// Every record overwrites the entry of its exam name, so after the pass
    /// each exam holds its chronologically last record; same-day records
    /// resolve to the later occurrence. Groups are keyed by the exam type of
    /// that latest record.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut latest: HashMap<&str, &LabResult> = HashMap::new();
        for record in dataset {
            latest.insert(record.exam_name.as_str(), record);
        }

        // BTreeMap keeps exam types in ordinal order
        let mut by_type: BTreeMap<&str, Vec<LabResult>> = BTreeMap::new();
        for record in latest.into_values() {
            by_type
                .entry(record.exam_type.as_str())
                .or_default()
                .push(record.clone());
        }

        let groups = by_type
            .into_iter()
            .map(|(exam_type, mut entries)| {
                entries.sort_by(|a, b| locale_compare(&a.exam_name, &b.exam_name));
                ExamGroup {
                    exam_type: exam_type.to_string(),
                    entries,
                }
            })
            .collect();

        LatestSnapshot { groups }
    }

    pub fn groups(&self) -> &[ExamGroup] {
        &self.groups
    }

    pub fn group(&self, exam_type: &str) -> Option<&ExamGroup> {
        self.groups.iter().find(|group| group.exam_type == exam_type)
    }

    /// Latest record of one exam
    pub fn latest(&self, exam_name: &str) -> Option<&LabResult> {
        self.groups
            .iter()
            .flat_map(|group| group.entries.iter())
            .find(|record| record.exam_name == exam_name)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Convenience wrapper around [`LatestSnapshot::from_dataset`]
pub fn latest_by_type(dataset: &Dataset) -> LatestSnapshot {
    LatestSnapshot::from_dataset(dataset)
}
