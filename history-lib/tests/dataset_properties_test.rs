//! Property tests over generated datasets

use chrono::{Days, NaiveDate};
use history_lib::normalizer::RecordNormalizer;
use history_lib::series::{AxisDomain, project};
use history_lib::snapshot::latest_by_type;
use history_lib::store::{deserialize_snapshot, serialize_snapshot};
use history_lib::{Dataset, LabResult, RawCell};
use proptest::prelude::*;

mod common;

const EXAM_TYPES: [&str; 3] = ["Hematologia", "Bioquímica", "Hormônios"];
const EXAM_NAMES: [&str; 5] = ["Hemoglobina", "Glicose", "TSH", "Ácido úrico", "Ferritina"];

fn lab_result_strategy() -> impl Strategy<Value = LabResult> {
    (0u64..2000, 0usize..EXAM_TYPES.len(), 0usize..EXAM_NAMES.len(), 0.0f64..1000.0).prop_map(
        |(day, type_idx, name_idx, value)| {
            let base = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
            LabResult::new(
                base.checked_add_days(Days::new(day)).unwrap(),
                EXAM_TYPES[type_idx],
                EXAM_NAMES[name_idx],
                value,
            )
        },
    )
}

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(lab_result_strategy(), 1..60).prop_map(Dataset::from_records)
}

proptest! {
    #[test]
    fn normalized_uploads_are_sorted_by_date(records in prop::collection::vec(lab_result_strategy(), 1..60)) {
        let rows: Vec<_> = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                common::exam_row(
                    index + 2,
                    RawCell::Date(record.date),
                    &record.exam_type,
                    &record.exam_name,
                    format!("{}", record.value).replace('.', ",").as_str(),
                )
            })
            .collect();

        let batch = RecordNormalizer::normalize(&rows).unwrap();
        prop_assert_eq!(batch.dataset.len(), records.len());
        prop_assert!(batch.dataset.records().windows(2).all(|pair| pair[0].date <= pair[1].date));
    }

    #[test]
    fn snapshot_round_trips(dataset in dataset_strategy()) {
        let snapshot = serialize_snapshot(&dataset).unwrap();
        prop_assert_eq!(deserialize_snapshot(&snapshot), Some(dataset));
    }

    #[test]
    fn grouping_is_idempotent(dataset in dataset_strategy()) {
        prop_assert_eq!(latest_by_type(&dataset), latest_by_type(&dataset));
    }

    #[test]
    fn grouping_keeps_the_latest_date_of_each_exam(dataset in dataset_strategy()) {
        let snapshot = latest_by_type(&dataset);
        for record in dataset.iter() {
            let latest = snapshot.latest(&record.exam_name).unwrap();
            prop_assert!(latest.date >= record.date);
        }
    }

    #[test]
    fn axis_domain_contains_every_point(dataset in dataset_strategy(), name_idx in 0usize..EXAM_NAMES.len()) {
        let series = project(&dataset, EXAM_NAMES[name_idx]);
        match series.domain {
            AxisDomain { lower, upper: Some(upper) } => {
                prop_assert!(lower >= 0.0);
                for point in &series.points {
                    prop_assert!(point.value >= lower && point.value <= upper);
                }
            }
            AxisDomain { upper: None, .. } => prop_assert!(series.points.is_empty()),
        }
    }
}
