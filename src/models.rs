//! Core data structures and types for WindCube processing.
//!
//! Defines the parsed file header, resource and catalog types handed to the
//! host, and the result of a windowed read.

use crate::constants::{COLUMN_SEPARATOR, SAMPLE_PERIOD_SECS};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Header information located at the top of a WindCube file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Number of metadata lines between the first line and the column header
    pub metadata_line_count: usize,
    /// All tab-separated header cells, including the timestamp column at index 0
    pub columns: Vec<String>,
}

impl FileHeader {
    /// Split a raw header line into cells
    pub fn from_header_line(metadata_line_count: usize, line: &str) -> Self {
        Self {
            metadata_line_count,
            columns: line.split(COLUMN_SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// Value columns with their row indices, skipping the timestamp column
    pub fn value_columns(&self) -> impl Iterator<Item = (usize, &str)> {
        self.columns
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, label)| (index, label.as_str()))
    }

    /// Index of the value column whose label matches `label` exactly
    pub fn find_column(&self, label: &str) -> Option<usize> {
        self.value_columns()
            .find(|(_, column)| *column == label)
            .map(|(index, _)| index)
    }

    /// Number of lines occupied by the first line, the metadata and the column header
    pub fn lines_before_data(&self) -> usize {
        self.metadata_line_count + 2
    }
}

/// Element type of a resource representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Float64,
}

impl DataType {
    pub fn size(&self) -> usize {
        match self {
            DataType::Float64 => 8,
        }
    }
}

/// One channel of a WindCube catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub unit: String,
    pub group: String,
    pub file_source_id: String,
    /// Column label exactly as it appears in the file header
    pub original_name: String,
    #[serde(with = "crate::config::timespan")]
    pub sample_period: TimeDelta,
    pub data_type: DataType,
}

impl Resource {
    /// Fill fields that are empty on `self` from `other`
    fn absorb(&mut self, other: &Resource) {
        if self.unit.is_empty() {
            self.unit = other.unit.clone();
        }
        if self.group.is_empty() {
            self.group = other.group.clone();
        }
    }
}

/// Resource catalog produced for the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceCatalog {
    pub id: String,
    pub title: String,
    pub resources: Vec<Resource>,
}

impl ResourceCatalog {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            resources: Vec::new(),
        }
    }

    /// Merge resources keyed by id, keeping existing fields and insertion order
    pub fn merge(&mut self, resources: impl IntoIterator<Item = Resource>) {
        for resource in resources {
            match self.resources.iter_mut().find(|r| r.id == resource.id) {
                Some(existing) => existing.absorb(&resource),
                None => self.resources.push(resource),
            }
        }
    }

    pub fn find(&self, resource_id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == resource_id)
    }
}

/// Result of reading one resource over a time window
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResult {
    pub begin: DateTime<Utc>,
    pub data: Vec<f64>,
    /// 1 where the slot was populated from a file, 0 otherwise
    pub status: Vec<u8>,
}

impl ReadResult {
    /// Start of the interval represented by `slot`
    pub fn slot_time(&self, slot: usize) -> DateTime<Utc> {
        self.begin + TimeDelta::seconds(slot as i64 * SAMPLE_PERIOD_SECS)
    }

    /// Iterate present samples with their slot start time
    pub fn present(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.data
            .iter()
            .zip(&self.status)
            .enumerate()
            .filter(|(_, (_, status))| **status == 1)
            .map(|(slot, (value, _))| (self.slot_time(slot), *value))
    }
}
