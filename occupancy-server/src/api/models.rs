//! Sheets API payloads and the raw table handed to the breakdown processor

use serde::Deserialize;
use serde_json::Value;

/// Rows exactly as returned by the sheet; row 0 is the header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Header row, None for an empty table
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(|r| r.as_slice())
    }

    /// Rows after the header
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Response of `spreadsheets.values.get`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub major_dimension: Option<String>,
    /// Absent when the range holds no data
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Convert cells to text. Formatted values are already strings; anything
    /// else is rendered as its JSON text.
    pub fn into_table(self) -> RawTable {
        RawTable::new(
            self.values
                .into_iter()
                .map(|row| row.into_iter().map(cell_to_string).collect())
                .collect(),
        )
    }
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Error body returned by Google APIs
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorBody {
    pub error: GoogleErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl GoogleErrorDetail {
    /// `STATUS (code): message`, omitting whatever Google left out
    pub fn describe(&self) -> String {
        match (&self.status, self.code) {
            (Some(status), Some(code)) => format!("{} ({}): {}", status, code, self.message),
            (Some(status), None) => format!("{}: {}", status, self.message),
            (None, _) => self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_range_into_table() {
        let body = json!({
            "range": "Sheet1!A1:Q3",
            "majorDimension": "ROWS",
            "values": [
                ["Timestamp", "Main Gym"],
                ["2024-01-01T10:00:00Z", 5, true, null],
            ]
        });

        let range: ValueRange = serde_json::from_value(body).unwrap();
        assert_eq!(range.major_dimension.as_deref(), Some("ROWS"));

        let table = range.into_table();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.data_rows()[0],
            vec!["2024-01-01T10:00:00Z", "5", "true", ""]
        );
    }

    #[test]
    fn test_value_range_without_values() {
        let range: ValueRange =
            serde_json::from_value(json!({"range": "Sheet1!A1:Q1", "majorDimension": "ROWS"}))
                .unwrap();
        assert!(range.into_table().is_empty());
    }

    #[test]
    fn test_google_error_describe() {
        let body: GoogleErrorBody = serde_json::from_value(json!({
            "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
        }))
        .unwrap();
        assert_eq!(
            body.error.describe(),
            "NOT_FOUND (404): Requested entity was not found."
        );

        let bare: GoogleErrorBody =
            serde_json::from_value(json!({"error": {"message": "Bad range"}})).unwrap();
        assert_eq!(bare.error.describe(), "Bad range");
    }

    #[test]
    fn test_raw_table_accessors() {
        let empty = RawTable::default();
        assert_eq!(empty.header(), None);
        assert!(empty.data_rows().is_empty());

        let header_only = RawTable::new(vec![vec!["Timestamp".to_string()]]);
        assert_eq!(header_only.header().map(|h| h.len()), Some(1));
        assert!(header_only.data_rows().is_empty());
    }
}
