//! Availability estimation for single WindCube files
//!
//! Availability is the share of timestamped rows relative to one full day of
//! 10-minute samples. The denominator stays at one day whatever the file
//! period or query window.

use crate::constants::{EXPECTED_DAILY_SLOTS, TIMESTAMP_FORMAT, TIMESTAMP_LENGTH};
use crate::error::{Result, WindCubeError};
use crate::header::{lossy_lines, parse_metadata_line_count};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Whether `prefix` has the exact `yyyy/MM/dd HH:mm` layout
fn has_timestamp_layout(prefix: &[u8]) -> bool {
    prefix.len() == TIMESTAMP_LENGTH
        && prefix.iter().enumerate().all(|(i, &b)| match i {
            4 | 7 => b == b'/',
            10 => b == b' ',
            13 => b == b':',
            _ => b.is_ascii_digit(),
        })
}

/// Parse the leading timestamp of a data row, `None` when it is not one
pub fn parse_row_timestamp(line: &str) -> Option<NaiveDateTime> {
    // chrono skips whitespace and accepts single-digit fields
    let prefix = line.as_bytes().get(..TIMESTAMP_LENGTH)?;
    if !has_timestamp_layout(prefix) {
        return None;
    }

    NaiveDateTime::parse_from_str(line.get(..TIMESTAMP_LENGTH)?, TIMESTAMP_FORMAT).ok()
}

/// Count data rows with a parseable timestamp
pub fn count_valid_rows(path: &Path) -> Result<usize> {
    let file = File::open(path)?;
    let mut lines = lossy_lines(BufReader::new(file));

    let first_line = lines
        .next()
        .transpose()?
        .ok_or_else(|| WindCubeError::malformed(path, "File is empty"))?;
    let metadata_line_count = parse_metadata_line_count(&first_line, path)?;

    // first line already consumed, so skip metadata plus the column header
    let mut valid_rows = 0;
    for line in lines.skip(metadata_line_count + 1) {
        if parse_row_timestamp(&line?).is_some() {
            valid_rows += 1;
        }
    }

    Ok(valid_rows)
}

/// Fraction of one day of samples present in the file
pub fn estimate_availability(path: &Path) -> Result<f64> {
    let valid_rows = count_valid_rows(path)?;
    let availability = valid_rows as f64 / EXPECTED_DAILY_SLOTS as f64;

    debug!(
        "Availability of {}: {} valid rows, {:.3}",
        path.display(),
        valid_rows,
        availability
    );

    Ok(availability)
}
