//! Typed view over a single sheet row
//!
//! Cells arrive as strings. `Timestamp` is parsed on demand, `Day` is kept as
//! text and every other column is coerced to a count.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use std::collections::HashMap;

use super::areas::Area;
use super::error::BreakdownError;

pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const DAY_COLUMN: &str = "Day";

/// Offset-carrying formats not covered by RFC 3339 parsing
const AWARE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    // Google Forms response sheets
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A reading time as written in the sheet
///
/// Timestamps that carry an offset keep it; timestamps without one stay naive
/// so that no offset is invented on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl Timestamp {
    /// Parse a `Timestamp` cell. Returns None for empty or unrecognised text.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Timestamp::Aware(dt));
        }
        for format in AWARE_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(raw, format) {
                return Some(Timestamp::Aware(dt));
            }
        }
        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(Timestamp::Naive(dt));
            }
        }
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
                return date.and_hms_opt(0, 0, 0).map(Timestamp::Naive);
            }
        }
        None
    }

    /// Date and time as written, ignoring any offset
    pub fn wall_clock(&self) -> NaiveDateTime {
        match self {
            Timestamp::Aware(dt) => dt.naive_local(),
            Timestamp::Naive(dt) => *dt,
        }
    }

    /// Ordering key: UTC for aware timestamps, wall clock for naive ones
    pub fn ordering_key(&self) -> NaiveDateTime {
        match self {
            Timestamp::Aware(dt) => dt.naive_utc(),
            Timestamp::Naive(dt) => *dt,
        }
    }

    /// ISO-8601 rendering; the offset is printed as `+HH:MM` when present
    pub fn to_iso8601(&self) -> String {
        match self {
            Timestamp::Aware(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            Timestamp::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

/// Coerce a count cell to a number. Empty, non-numeric and non-finite values
/// read as zero.
pub fn coerce_count(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// One data row keyed by header name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRecord {
    /// Raw `Timestamp` cell, if the sheet has that column
    pub timestamp: Option<String>,
    /// Raw `Day` cell, if the sheet has that column
    pub day: Option<String>,
    counts: HashMap<String, f64>,
}

impl ParsedRecord {
    /// Zip a data row onto the header.
    ///
    /// Rows shorter than the header (the Sheets API drops trailing empty
    /// cells) read the missing cells as empty. Extra cells are ignored. When
    /// a header name repeats, the first column wins.
    pub fn from_row(header: &[String], row: &[String]) -> Self {
        let mut record = ParsedRecord::default();

        for (idx, name) in header.iter().enumerate() {
            let name = name.trim();
            let cell = row.get(idx).map(|c| c.trim()).unwrap_or("");

            match name {
                TIMESTAMP_COLUMN => {
                    if record.timestamp.is_none() {
                        record.timestamp = Some(cell.to_string());
                    }
                }
                DAY_COLUMN => {
                    if record.day.is_none() {
                        record.day = Some(cell.to_string());
                    }
                }
                _ => {
                    record
                        .counts
                        .entry(name.to_string())
                        .or_insert_with(|| coerce_count(cell));
                }
            }
        }

        record
    }

    /// Coerced value of a count column, None if the sheet lacks the column
    pub fn count(&self, column: &str) -> Option<f64> {
        self.counts.get(column).copied()
    }

    /// Iterate over all count columns and their coerced values
    pub fn counts(&self) -> impl Iterator<Item = (&str, f64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Parse the `Timestamp` cell
    pub fn parse_timestamp(&self) -> Result<Timestamp, BreakdownError> {
        let raw = self.timestamp.as_deref().unwrap_or("");
        Timestamp::parse(raw).ok_or_else(|| BreakdownError::InvalidTimestamp {
            value: raw.to_string(),
        })
    }

    /// Sum of the area's columns present in this record
    pub fn area_total(&self, area: &Area) -> f64 {
        area.columns.iter().filter_map(|c| self.count(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakdown::areas::AREA_MAPPINGS;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count("5"), 5.0);
        assert_eq!(coerce_count(" 12 "), 12.0);
        assert_eq!(coerce_count("2.5"), 2.5);
        assert_eq!(coerce_count("-3"), -3.0);
        assert_eq!(coerce_count(""), 0.0);
        assert_eq!(coerce_count("abc"), 0.0);
        assert_eq!(coerce_count("1,234"), 0.0);
        assert_eq!(coerce_count("NaN"), 0.0);
        assert_eq!(coerce_count("inf"), 0.0);
    }

    #[test]
    fn test_parse_rfc3339_keeps_offset() {
        let ts = Timestamp::parse("2024-01-01T10:00:00Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-01-01T10:00:00+00:00");

        let ts = Timestamp::parse("2024-03-05T08:15:00-05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-03-05T08:15:00-05:00");
        assert_eq!(ts.wall_clock().to_string(), "2024-03-05 08:15:00");
        assert_eq!(ts.ordering_key().to_string(), "2024-03-05 13:15:00");
    }

    #[test]
    fn test_parse_naive_forms() {
        let ts = Timestamp::parse("2024-01-01 10:00:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-01-01T10:00:00");

        let ts = Timestamp::parse("1/15/2024 9:05:30").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-01-15T09:05:30");

        let ts = Timestamp::parse("1/15/2024 18:45").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-01-15T18:45:00");

        let ts = Timestamp::parse("2024-02-29").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-02-29T00:00:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Timestamp::parse(""), None);
        assert_eq!(Timestamp::parse("   "), None);
        assert_eq!(Timestamp::parse("yesterday"), None);
        assert_eq!(Timestamp::parse("2024-13-45"), None);
    }

    #[test]
    fn test_from_row_short_row_and_duplicates() {
        let header = strings(&["Timestamp", "Day", "Main Gym", "Track", "Main Gym"]);
        let row = strings(&["2024-01-01T10:00:00Z", "Monday", "7"]);
        let record = ParsedRecord::from_row(&header, &row);

        assert_eq!(record.timestamp.as_deref(), Some("2024-01-01T10:00:00Z"));
        assert_eq!(record.day.as_deref(), Some("Monday"));
        assert_eq!(record.count("Main Gym"), Some(7.0));
        assert_eq!(record.count("Track"), Some(0.0));
        assert_eq!(record.count("Day"), None);
        assert_eq!(record.count("Weight Room"), None);
    }

    #[test]
    fn test_from_row_ignores_extra_cells() {
        let header = strings(&["Timestamp", "Track"]);
        let row = strings(&["2024-01-01T10:00:00Z", "3", "99"]);
        let record = ParsedRecord::from_row(&header, &row);
        assert_eq!(record.counts().count(), 1);
    }

    #[test]
    fn test_missing_timestamp_column() {
        let header = strings(&["Main Gym"]);
        let record = ParsedRecord::from_row(&header, &strings(&["4"]));
        assert_eq!(
            record.parse_timestamp(),
            Err(BreakdownError::InvalidTimestamp {
                value: String::new()
            })
        );
    }

    #[test]
    fn test_area_total_skips_missing_columns() {
        let header = strings(&["Timestamp", "Weight Room", "Treadmills"]);
        let row = strings(&["2024-01-01T10:00:00Z", "2", "bad"]);
        let record = ParsedRecord::from_row(&header, &row);

        let weight_room = AREA_MAPPINGS[1];
        assert_eq!(weight_room.name, "Weight Room");
        assert_eq!(record.area_total(&weight_room), 2.0);
    }
}
