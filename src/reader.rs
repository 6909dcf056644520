//! Time-aligned reader for WindCube files
//!
//! Decodes the rows of one file into caller-owned buffers on the fixed
//! 10-minute grid. Each sample occupies 8 bytes in the data buffer and one
//! byte in the parallel status mask.
//!
//! Rows whose timestamp cannot be parsed are skipped, as are rows that fall
//! outside the buffer. A value that cannot be parsed aborts the request.

use crate::availability::parse_row_timestamp;
use crate::constants::{COLUMN_SEPARATOR, ELEMENT_SIZE, SAMPLE_PERIOD_SECS, sample_period};
use crate::error::{Result, WindCubeError};
use crate::header::{lossy_lines, parse_header};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// One resource to read from a file into caller-owned buffers
#[derive(Debug)]
pub struct ReadRequest<'a> {
    /// Column label exactly as stored in the catalog
    pub original_name: &'a str,
    /// `status.len() * 8` bytes of encoded samples
    pub data: &'a mut [u8],
    /// One byte per slot, 1 = present
    pub status: &'a mut [u8],
}

impl<'a> ReadRequest<'a> {
    pub fn new(original_name: &'a str, data: &'a mut [u8], status: &'a mut [u8]) -> Self {
        Self {
            original_name,
            data,
            status,
        }
    }

    /// Number of grid slots covered by this request
    pub fn slot_count(&self) -> usize {
        self.status.len()
    }

    fn validate(&self) -> Result<()> {
        let expected = self.status.len() * ELEMENT_SIZE;
        if self.data.len() != expected {
            return Err(WindCubeError::BufferSize {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

/// Encode one sample into its 8-byte cell representation
pub fn encode_value(value: f64) -> [u8; ELEMENT_SIZE] {
    value.to_le_bytes()
}

/// Decode one 8-byte cell
pub fn decode_value(cell: &[u8]) -> Option<f64> {
    let bytes: [u8; ELEMENT_SIZE] = cell.try_into().ok()?;
    Some(f64::from_le_bytes(bytes))
}

/// Decode a whole data buffer into samples
pub fn decode_buffer(data: &[u8]) -> Vec<f64> {
    data.chunks_exact(ELEMENT_SIZE)
        .filter_map(decode_value)
        .collect()
}

/// Grid slot of a row whose timestamp marks the end of its interval.
///
/// Returns `None` for rows outside `0..slot_count`.
pub fn grid_slot(
    interval_end: chrono::NaiveDateTime,
    file_begin: DateTime<Utc>,
    slot_count: usize,
) -> Option<usize> {
    let interval_start = (interval_end - sample_period()).and_utc();
    let elapsed = (interval_start - file_begin).num_seconds();
    let slot = elapsed.div_euclid(SAMPLE_PERIOD_SECS);

    if slot < 0 || slot as u64 >= slot_count as u64 {
        return None;
    }

    Some(slot as usize)
}

/// Parse a decimal value with `.` as separator and no grouping
pub fn parse_value(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Read every request from `path`, stopping at the first fatal error
pub fn read_file(
    path: &Path,
    file_begin: DateTime<Utc>,
    requests: &mut [ReadRequest<'_>],
) -> Result<()> {
    for request in requests.iter_mut() {
        read_request(path, file_begin, request)?;
    }
    Ok(())
}

/// Read one request from `path` into its buffers
pub fn read_request(
    path: &Path,
    file_begin: DateTime<Utc>,
    request: &mut ReadRequest<'_>,
) -> Result<()> {
    request.validate()?;

    let file = File::open(path)?;
    let mut lines = lossy_lines(BufReader::new(file));
    let header = parse_header(&mut lines, path)?;

    let Some(column) = header.find_column(request.original_name) else {
        debug!(
            "Column '{}' not found in {}, leaving request empty",
            request.original_name,
            path.display()
        );
        return Ok(());
    };

    let slot_count = request.slot_count();
    let first_data_line = header.lines_before_data() + 1;
    let mut written = 0;
    let mut skipped = 0;

    for (offset, line) in lines.enumerate() {
        let line = line?;

        let Some(interval_end) = parse_row_timestamp(&line) else {
            skipped += 1;
            continue;
        };

        let Some(slot) = grid_slot(interval_end, file_begin, slot_count) else {
            skipped += 1;
            continue;
        };

        let line_number = first_data_line + offset;
        let cell = line
            .split(COLUMN_SEPARATOR)
            .nth(column)
            .ok_or_else(|| WindCubeError::TruncatedRow {
                path: path.to_path_buf(),
                line: line_number,
                column,
            })?;

        let value = parse_value(cell).ok_or_else(|| WindCubeError::NumericFormat {
            path: path.to_path_buf(),
            line: line_number,
            column,
            value: cell.to_string(),
        })?;

        let byte_offset = slot * ELEMENT_SIZE;
        request.data[byte_offset..byte_offset + ELEMENT_SIZE].copy_from_slice(&encode_value(value));
        request.status[slot] = 1;
        written += 1;
    }

    debug!(
        "Read '{}' from {}: {} samples written, {} rows skipped",
        request.original_name,
        path.display(),
        written,
        skipped
    );

    Ok(())
}
