//! Application constants for the WindCube reader
//!
//! File format markers, grid cadence and identifier rules shared by the
//! parser, the catalog builder and the time-aligned reader.

use chrono::TimeDelta;

// =============================================================================
// Sampling Grid
// =============================================================================

/// Sample period of every WindCube channel, in seconds
pub const SAMPLE_PERIOD_SECS: i64 = 600;

/// Sample period of every WindCube channel
pub fn sample_period() -> TimeDelta {
    TimeDelta::seconds(SAMPLE_PERIOD_SECS)
}

/// Size in bytes of one encoded sample (IEEE-754 double)
pub const ELEMENT_SIZE: usize = 8;

/// Slots in one day at the fixed cadence, used as the availability denominator
pub const EXPECTED_DAILY_SLOTS: usize = 144;

// =============================================================================
// In-file Text Format
// =============================================================================

/// Timestamp format of column 0 in data rows
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Number of leading characters of a data row that hold the timestamp
pub const TIMESTAMP_LENGTH: usize = 16;

/// Column separator for header and data rows
pub const COLUMN_SEPARATOR: char = '\t';

// =============================================================================
// Resource Naming
// =============================================================================

/// Prefix applied to every normalized resource id
pub const RESOURCE_ID_PREFIX: &str = "WC_";

/// Group assigned to channels without a measurement height in their label
pub const DEFAULT_GROUP: &str = "Environment";

/// Full grammar a resource id must satisfy
pub const RESOURCE_ID_PATTERN: &str = r"^[a-zA-Z_][a-zA-Z_0-9]*$";

/// Whether `c` may start a resource id
pub fn is_id_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether `c` may appear after the first character of a resource id
pub fn is_id_body_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
