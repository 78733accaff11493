//! Per-exam history: chart points, value-axis domain and the exam selector.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::model::Dataset;
use crate::utils::{format_br_short_date, iso_date, locale_compare};

/// Share of the value spread added above and below the series
const AXIS_PADDING_RATIO: f64 = 0.2;
/// Padding used when every value is identical
const FLAT_SERIES_PADDING: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    /// `dd/mm/yy`
    pub label: String,
    pub value: f64,
}

/// Value-axis display range. `upper == None` leaves the top of the axis open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisDomain {
    pub lower: f64,
    pub upper: Option<f64>,
}

impl Default for AxisDomain {
    fn default() -> Self {
        AxisDomain {
            lower: 0.0,
            upper: None,
        }
    }
}

impl AxisDomain {
    /// Pad the observed range by a fifth of its spread (1 when flat). The lower
    /// bound is floored and clamped at zero, the upper bound is ceiled.
    pub fn padded(min: f64, max: f64) -> Self {
        let spread_padding = (max - min) * AXIS_PADDING_RATIO;
        let padding = if spread_padding == 0.0 {
            FLAT_SERIES_PADDING
        } else {
            spread_padding
        };
        AxisDomain {
            lower: (min - padding).floor().max(0.0),
            upper: Some((max + padding).ceil()),
        }
    }

    pub fn for_values(values: impl IntoIterator<Item = f64>) -> Self {
        let bounds = values.into_iter().fold(None, |bounds, value| match bounds {
            None => Some((value, value)),
            Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
        });
        match bounds {
            Some((min, max)) => Self::padded(min, max),
            None => AxisDomain::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesProjection {
    pub exam_name: String,
    pub points: Vec<SeriesPoint>,
    pub domain: AxisDomain,
}

impl SeriesProjection {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Every value recorded for `exam_name`, oldest first, with its axis domain
pub fn project(dataset: &Dataset, exam_name: &str) -> SeriesProjection {
    // Filtering keeps the dataset's date order
    let points: Vec<SeriesPoint> = dataset
        .iter()
        .filter(|record| record.exam_name == exam_name)
        .map(|record| SeriesPoint {
            date: record.date,
            label: format_br_short_date(record.date),
            value: record.value,
        })
        .collect();

    let domain = AxisDomain::for_values(points.iter().map(|point| point.value));

    SeriesProjection {
        exam_name: exam_name.to_string(),
        points,
        domain,
    }
}

/// Distinct exam names in collation order, for the exam selector
pub fn exam_options(dataset: &Dataset) -> Vec<String> {
    let names: BTreeSet<&str> = dataset
        .iter()
        .map(|record| record.exam_name.as_str())
        .collect();
    let mut options: Vec<String> = names.into_iter().map(str::to_string).collect();
    options.sort_by(|a, b| locale_compare(a, b));
    options
}

/// Keep the current selection while it is still offered, otherwise fall back
/// to the first option
pub fn resolve_selection(options: &[String], current: Option<&str>) -> Option<String> {
    match current {
        Some(name) if options.iter().any(|option| option == name) => Some(name.to_string()),
        _ => options.first().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LabResult;

    fn dataset(entries: &[(&str, (i32, u32, u32), f64)]) -> Dataset {
        Dataset::from_records(
            entries
                .iter()
                .map(|(name, (y, m, d), value)| {
                    LabResult::new(
                        NaiveDate::from_ymd_opt(*y, *m, *d).unwrap(),
                        "Hematologia",
                        *name,
                        *value,
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_flat_series_pads_by_one() {
        assert_eq!(
            AxisDomain::for_values([10.0, 10.0, 10.0]),
            AxisDomain {
                lower: 9.0,
                upper: Some(11.0)
            }
        );
    }

    #[test]
    fn test_lower_bound_clamps_at_zero() {
        assert_eq!(
            AxisDomain::for_values([0.0, 100.0]),
            AxisDomain {
                lower: 0.0,
                upper: Some(120.0)
            }
        );
    }

    #[test]
    fn test_padding_is_floored_and_ceiled() {
        // spread 5 -> padding 1: [12.5 - 1, 17.5 + 1] -> [11, 19]
        assert_eq!(
            AxisDomain::for_values([12.5, 17.5]),
            AxisDomain {
                lower: 11.0,
                upper: Some(19.0)
            }
        );
    }

    #[test]
    fn test_no_values_leaves_upper_open() {
        assert_eq!(
            AxisDomain::for_values(std::iter::empty()),
            AxisDomain {
                lower: 0.0,
                upper: None
            }
        );
    }

    #[test]
    fn test_project_filters_one_exam_in_date_order() {
        let data = dataset(&[
            ("Hemoglobina", (2024, 2, 10), 14.0),
            ("Hematócrito", (2024, 1, 15), 41.0),
            ("Hemoglobina", (2024, 1, 10), 13.5),
        ]);

        let series = project(&data, "Hemoglobina");
        let labels: Vec<&str> = series.points.iter().map(|p| p.label.as_str()).collect();
        let values: Vec<f64> = series.points.iter().map(|p| p.value).collect();

        assert_eq!(labels, vec!["10/01/24", "10/02/24"]);
        assert_eq!(values, vec![13.5, 14.0]);
    }

    #[test]
    fn test_project_unknown_exam_is_empty() {
        let data = dataset(&[("Hemoglobina", (2024, 2, 10), 14.0)]);
        let series = project(&data, "Ferritina");

        assert!(series.is_empty());
        assert_eq!(series.domain, AxisDomain::default());
    }

    #[test]
    fn test_exam_options_are_distinct_and_collated() {
        let data = dataset(&[
            ("Plaquetas", (2024, 1, 1), 250.0),
            ("hemoglobina", (2024, 1, 1), 13.0),
            ("Ácido fólico", (2024, 1, 1), 9.0),
            ("Plaquetas", (2024, 2, 1), 260.0),
        ]);

        assert_eq!(
            exam_options(&data),
            vec!["Ácido fólico", "hemoglobina", "Plaquetas"]
        );
    }

    #[test]
    fn test_resolve_selection() {
        let options = vec!["Ferritina".to_string(), "Hemoglobina".to_string()];

        assert_eq!(
            resolve_selection(&options, None),
            Some("Ferritina".to_string())
        );
        assert_eq!(
            resolve_selection(&options, Some("Hemoglobina")),
            Some("Hemoglobina".to_string())
        );
        assert_eq!(
            resolve_selection(&options, Some("Removido")),
            Some("Ferritina".to_string())
        );
        assert_eq!(resolve_selection(&[], None), None);
    }
}
