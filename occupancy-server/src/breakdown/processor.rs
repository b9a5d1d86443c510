//! Breakdown strategies
//!
//! `Latest` is the live behaviour: the last row of the sheet is the
//! authoritative reading and every area gets a single count. `Hourly` keeps
//! today's readings and reports one count per hour from 06:00 to 22:00.

use chrono::{DateTime, Timelike, Utc};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::BreakdownResult;
use super::areas::{AREA_MAPPINGS, area_names, is_mapped_column};
use super::error::BreakdownError;
use super::record::{ParsedRecord, Timestamp};
use crate::api::RawTable;

/// First and last hour bucket of the hourly view
const FIRST_HOUR: u32 = 6;
const LAST_HOUR: u32 = 22;

/// How the raw table is turned into a breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakdownStrategy {
    /// Single count per area from the last row
    #[default]
    Latest,
    /// One count per hour of today, per area
    Hourly,
}

impl BreakdownStrategy {
    /// Run the strategy. `now` is only read by the hourly strategy.
    pub fn apply(
        self,
        table: &RawTable,
        now: DateTime<Utc>,
    ) -> Result<BreakdownResult, BreakdownError> {
        match self {
            BreakdownStrategy::Latest => process(table),
            BreakdownStrategy::Hourly => process_hourly(table, now),
        }
    }
}

impl FromStr for BreakdownStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" => Ok(BreakdownStrategy::Latest),
            "hourly" => Ok(BreakdownStrategy::Hourly),
            other => Err(format!(
                "unknown breakdown mode '{}' (expected 'latest' or 'hourly')",
                other
            )),
        }
    }
}

impl fmt::Display for BreakdownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakdownStrategy::Latest => write!(f, "latest"),
            BreakdownStrategy::Hourly => write!(f, "hourly"),
        }
    }
}

/// Header and data rows, or `EmptyInput` when there are no data rows
fn split_table(table: &RawTable) -> Result<(&[String], &[Vec<String>]), BreakdownError> {
    match table.header() {
        Some(header) if !table.data_rows().is_empty() => Ok((header, table.data_rows())),
        _ => Err(BreakdownError::EmptyInput),
    }
}

/// Integer count for an area total. Truncates toward zero.
fn to_count(total: f64) -> i64 {
    total.trunc() as i64
}

/// Build the live breakdown from the last row of the table
pub fn process(table: &RawTable) -> Result<BreakdownResult, BreakdownError> {
    let (header, rows) = split_table(table)?;
    let last_row = rows.last().ok_or(BreakdownError::EmptyInput)?;

    let latest = ParsedRecord::from_row(header, last_row);
    let timestamp = latest.parse_timestamp()?;
    debug!(
        "Using data from: {} ({})",
        timestamp.to_iso8601(),
        latest.day.as_deref().unwrap_or("no day")
    );

    let unmapped: Vec<&str> = latest
        .counts()
        .map(|(column, _)| column)
        .filter(|column| !is_mapped_column(column))
        .collect();
    if !unmapped.is_empty() {
        debug!("Ignoring unmapped columns: {:?}", unmapped);
    }

    let mut series_by_place = Vec::with_capacity(AREA_MAPPINGS.len());
    let mut total_people: i64 = 0;

    for area in AREA_MAPPINGS {
        let total = to_count(latest.area_total(area));
        debug!("{}: {} (columns: {:?})", area.name, total, area.columns);
        total_people = total_people.saturating_add(total);
        series_by_place.push((area.name.to_string(), vec![total]));
    }

    info!(
        "Breakdown from {} data rows: {} people across {} areas",
        rows.len(),
        total_people,
        AREA_MAPPINGS.len()
    );

    let areas = area_names();
    Ok(BreakdownResult {
        labels: areas.clone(),
        places: areas,
        series_by_place,
        last_updated_utc: timestamp.to_iso8601(),
    })
}

/// Build an hour-by-hour breakdown of today's readings.
///
/// Rows without a usable timestamp are skipped. Within each hour the last row
/// in sheet order wins; hours without readings report zero.
pub fn process_hourly(
    table: &RawTable,
    now: DateTime<Utc>,
) -> Result<BreakdownResult, BreakdownError> {
    let (header, rows) = split_table(table)?;
    let today = now.date_naive();

    let mut readings: Vec<(Timestamp, ParsedRecord)> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let record = ParsedRecord::from_row(header, row);
        match record.parse_timestamp() {
            Ok(ts) if ts.wall_clock().date() == today => readings.push((ts, record)),
            Ok(_) => {}
            // Sheet row numbers are 1-based and the header is row 1
            Err(err) => warn!("Skipping sheet row {}: {}", idx + 2, err),
        }
    }

    let places = area_names();

    if readings.is_empty() {
        debug!("No readings for {}", today);
        return Ok(BreakdownResult {
            labels: Vec::new(),
            series_by_place: places.iter().map(|p| (p.clone(), Vec::new())).collect(),
            places,
            last_updated_utc: Timestamp::Aware(now.fixed_offset()).to_iso8601(),
        });
    }

    let mut by_hour: BTreeMap<u32, &ParsedRecord> = BTreeMap::new();
    for (ts, record) in &readings {
        by_hour.insert(ts.wall_clock().hour(), record);
    }

    let mut labels = Vec::new();
    let mut series_by_place: Vec<(String, Vec<i64>)> =
        places.iter().map(|p| (p.clone(), Vec::new())).collect();

    for hour in FIRST_HOUR..=LAST_HOUR {
        let reading = by_hour.get(&hour);
        for (area, (_, series)) in AREA_MAPPINGS.iter().zip(series_by_place.iter_mut()) {
            series.push(reading.map_or(0, |r| to_count(r.area_total(area))));
        }
        labels.push(format!("{:02}:00", hour));
    }

    let last_updated = readings
        .iter()
        .map(|(ts, _)| ts)
        .max_by_key(|ts| ts.ordering_key())
        .map(Timestamp::to_iso8601)
        .unwrap_or_default();

    info!(
        "Hourly breakdown for {}: {} readings in {} hour buckets",
        today,
        readings.len(),
        by_hour.len()
    );

    Ok(BreakdownResult {
        labels,
        places,
        series_by_place,
        last_updated_utc: last_updated,
    })
}
