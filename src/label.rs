//! Column label normalization
//!
//! Turns a free-text header cell such as `Wind Speed (10m) (m/s)` into a
//! validated resource id, a unit and a group tag.

use crate::constants::{
    DEFAULT_GROUP, RESOURCE_ID_PATTERN, RESOURCE_ID_PREFIX, is_id_body_char, is_id_start_char,
};
use crate::error::{Result, WindCubeError};
use regex::Regex;
use std::sync::LazyLock;

static RESOURCE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(RESOURCE_ID_PATTERN).expect("resource id pattern is a valid regex")
});

/// Normalized form of one header cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLabel {
    pub resource_id: String,
    pub unit: String,
    pub group: String,
}

/// Split `"<name> (<unit>)"` into name and unit.
///
/// The unit is the text inside the last parenthesized group that is preceded
/// by whitespace. Labels without such a group yield the whole label and an
/// empty unit.
pub fn split_name_and_unit(label: &str) -> (&str, &str) {
    let Some(close) = label.rfind(')') else {
        return (label, "");
    };

    let before_close = &label[..close];
    let open = before_close
        .match_indices('(')
        .rev()
        .map(|(index, _)| index)
        .find(|&index| {
            before_close[..index]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace)
        });

    match open {
        Some(open) => (label[..open].trim(), &label[open + 1..close]),
        None => (label, ""),
    }
}

/// Find the first `<digits>m` token, e.g. the `10m` in `Wind Speed (10m)`
pub fn find_height_token(label: &str) -> Option<&str> {
    let bytes = label.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index].is_ascii_digit() {
            let start = index;
            while index < bytes.len() && bytes[index].is_ascii_digit() {
                index += 1;
            }
            if bytes.get(index) == Some(&b'm') {
                return Some(&label[start..=index]);
            }
        } else {
            index += 1;
        }
    }

    None
}

/// Replace each run of characters outside the identifier grammar with one `_`.
///
/// Already valid identifiers are returned unchanged.
pub fn sanitize_identifier(candidate: &str) -> String {
    let mut id = String::with_capacity(candidate.len());
    let mut in_invalid_run = false;

    for c in candidate.chars() {
        if is_id_body_char(c) {
            id.push(c);
            in_invalid_run = false;
        } else if !in_invalid_run {
            id.push('_');
            in_invalid_run = true;
        }
    }

    // only ASCII remains at this point
    if id.chars().next().is_some_and(|c| !is_id_start_char(c)) {
        id.replace_range(..1, "_");
    }

    id
}

pub fn is_valid_resource_id(id: &str) -> bool {
    RESOURCE_ID_REGEX.is_match(id)
}

/// Normalize one non-blank header cell
pub fn normalize_label(label: &str) -> Result<NormalizedLabel> {
    let (raw_name, unit) = split_name_and_unit(label);
    let candidate = format!("{}{}", RESOURCE_ID_PREFIX, raw_name);
    let resource_id = sanitize_identifier(&candidate);

    if !is_valid_resource_id(&resource_id) {
        return Err(WindCubeError::InvalidResourceName {
            label: label.to_string(),
            candidate: resource_id,
        });
    }

    let group = find_height_token(label).unwrap_or(DEFAULT_GROUP);

    Ok(NormalizedLabel {
        resource_id,
        unit: unit.to_string(),
        group: group.to_string(),
    })
}
