use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-only shapes, tried in order. Two-digit years come first so that
/// `10/01/24` is not read as the year 24.
const DATE_FORMATS: [&str; 9] = [
    "%d/%m/%y", "%d-%m-%y", "%d.%m.%y", // day first, two-digit year
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", // year first
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", // day first (Brazilian)
];

/// Date and time shapes without an offset; the time is discarded
const DATE_TIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

pub fn get_utc_iso_datetime() -> String {
    let timestamp = chrono::Utc::now().to_rfc3339();
    return timestamp;
}

/// Parse a textual date into a calendar date.
///
/// Accepted shapes:
/// * year first: `2024-01-10`, `2024/01/10`, `2024.01.10`
/// * day first (Brazilian): `10/01/2024`, `10-01-2024`, `10/01/24`
/// * RFC 3339 date-times (`2024-01-10T08:30:00.000Z`), which keep the date
///   as written in their own offset
/// * date-times without an offset, e.g. `2024-01-10 08:30` or `10/01/2024 08:30`
///
/// Two-digit years follow chrono's `%y` pivot (00-69 → 2000s, 70-99 → 1900s).
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|datetime| datetime.date_naive())
        })
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|datetime| datetime.date())
        })
}

/// `dd/mm/yyyy`, as pt-BR `toLocaleDateString` renders it
pub fn format_br_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/mm/yy`, used for chart axis labels
pub fn format_br_short_date(date: NaiveDate) -> String {
    date.format("%d/%m/%y").to_string()
}

/// Serde adapter storing dates as ISO `YYYY-MM-DD` text.
///
/// Reading is lenient: full ISO date-times such as `2024-01-10T00:00:00.000Z`
/// revive to their date part.
pub mod iso_date {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_date_string(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid date '{text}'")))
    }
}
