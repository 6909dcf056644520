//! WindCube header parsing.
//!
//! The first line of a WindCube export carries the number of metadata lines
//! that follow it. After those lines comes the tab-separated column header,
//! then the data rows.

use crate::error::{Result, WindCubeError};
use crate::models::FileHeader;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Lines of a file decoded leniently.
///
/// Exports are not guaranteed to be UTF-8 (units such as `°` are often
/// written in Latin-1), so invalid bytes become U+FFFD instead of failing the
/// read. A trailing `\r` is stripped. Decoding is deterministic, so labels
/// read here match the same labels read again later.
pub fn lossy_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<String>> {
    reader.split(b'\n').map(|line| {
        let mut bytes = line?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    })
}

/// Extract the first run of decimal digits anywhere in `line`
pub fn extract_leading_integer(line: &str) -> Option<usize> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let digits = &line[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end].parse().ok()
}

/// Parse the metadata line count from the first line of a file
pub fn parse_metadata_line_count(first_line: &str, path: &Path) -> Result<usize> {
    extract_leading_integer(first_line).ok_or_else(|| {
        WindCubeError::malformed(path, "First line does not contain a header line count")
    })
}

/// Consume the header from a line iterator positioned at the start of a file.
///
/// On success the iterator is positioned at the first data row.
pub fn parse_header<I>(lines: &mut I, path: &Path) -> Result<FileHeader>
where
    I: Iterator<Item = io::Result<String>>,
{
    let first_line = lines
        .next()
        .transpose()?
        .ok_or_else(|| WindCubeError::malformed(path, "File is empty"))?;

    let metadata_line_count = parse_metadata_line_count(&first_line, path)?;

    for _ in 0..metadata_line_count {
        if lines.next().transpose()?.is_none() {
            break;
        }
    }

    let header_line = lines.next().transpose()?.ok_or_else(|| {
        WindCubeError::malformed(
            path,
            format!(
                "Missing column header after {} metadata lines",
                metadata_line_count
            ),
        )
    })?;

    let header = FileHeader::from_header_line(metadata_line_count, &header_line);

    debug!(
        "Parsed header for {}: metadata_lines={}, columns={}",
        path.display(),
        metadata_line_count,
        header.columns.len()
    );

    Ok(header)
}

/// Open a file and parse its header
pub fn read_header(path: &Path) -> Result<FileHeader> {
    let file = File::open(path)?;
    let mut lines = lossy_lines(BufReader::new(file));
    parse_header(&mut lines, path)
}
