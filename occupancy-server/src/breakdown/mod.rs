//! Breakdown of sheet readings into per-area people counts
//!
//! Takes the raw table fetched by the Sheets adapter and the static area
//! mapping and produces the payload served by `/api/hourly_breakdown`.
//! Nothing in here performs I/O.

pub mod areas;
pub mod error;
pub mod processor;
pub mod record;

pub use error::BreakdownError;
pub use processor::BreakdownStrategy;

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

/// Response payload for the breakdown endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownResult {
    pub labels: Vec<String>,
    pub places: Vec<String>,
    /// One series per place, in `places` order
    pub series_by_place: Vec<(String, Vec<i64>)>,
    pub last_updated_utc: String,
}

impl BreakdownResult {
    /// Series for a single place
    pub fn series(&self, place: &str) -> Option<&[i64]> {
        self.series_by_place
            .iter()
            .find(|(name, _)| name == place)
            .map(|(_, series)| series.as_slice())
    }
}

/// Serializes `series_by_place` as a JSON object keeping area order
struct SeriesByPlace<'a>(&'a [(String, Vec<i64>)]);

impl Serialize for SeriesByPlace<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (place, series) in self.0 {
            map.serialize_entry(place, series)?;
        }
        map.end()
    }
}

impl Serialize for BreakdownResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BreakdownResult", 4)?;
        state.serialize_field("labels", &self.labels)?;
        state.serialize_field("places", &self.places)?;
        state.serialize_field("seriesByPlace", &SeriesByPlace(&self.series_by_place))?;
        state.serialize_field("last_updated_utc", &self.last_updated_utc)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_keeps_area_order() {
        let result = BreakdownResult {
            labels: vec!["Track".to_string(), "Lobby".to_string()],
            places: vec!["Track".to_string(), "Lobby".to_string()],
            series_by_place: vec![
                ("Track".to_string(), vec![4]),
                ("Lobby".to_string(), vec![1]),
            ],
            last_updated_utc: "2024-01-01T10:00:00+00:00".to_string(),
        };

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"labels":["Track","Lobby"],"places":["Track","Lobby"],"seriesByPlace":{"Track":[4],"Lobby":[1]},"last_updated_utc":"2024-01-01T10:00:00+00:00"}"#
        );
    }

    #[test]
    fn test_series_lookup() {
        let result = BreakdownResult {
            labels: vec![],
            places: vec!["Track".to_string()],
            series_by_place: vec![("Track".to_string(), vec![])],
            last_updated_utc: String::new(),
        };
        assert_eq!(result.series("Track"), Some(&[][..]));
        assert_eq!(result.series("Lobby"), None);
    }
}
