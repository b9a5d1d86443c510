//! Error types for breakdown processing.

use thiserror::Error;

/// Failures raised while turning sheet rows into a breakdown.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BreakdownError {
    /// The table has a header (or nothing) but no data rows.
    #[error("no data rows found in spreadsheet")]
    EmptyInput,

    /// The authoritative row has no usable `Timestamp`.
    #[error("invalid Timestamp value '{value}' in latest row")]
    InvalidTimestamp { value: String },
}
