//! Configuration management and validation.
//!
//! The data source configuration maps catalog ids to catalog descriptions.
//! It is loaded once from JSON, validated, and then shared read-only for
//! the lifetime of the data source.

use crate::constants::SAMPLE_PERIOD_SECS;
use crate::error::{Result, WindCubeError};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

static GLOBAL_CONFIG: OnceLock<DataSourceConfig> = OnceLock::new();

/// Rule for locating the physical files of one logical channel group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSource {
    /// Directory segments below the data root, may contain strftime specifiers
    #[serde(default)]
    pub path_segments: Vec<String>,

    /// File name template, may contain strftime specifiers and glob wildcards
    #[serde(default)]
    pub file_name_template: String,

    /// Time span covered by one file
    #[serde(with = "timespan")]
    pub file_period: TimeDelta,

    /// Offset of the local time used in file names relative to UTC
    #[serde(with = "timespan", default = "TimeDelta::zero")]
    pub utc_offset: TimeDelta,

    /// Explicit file list, bypasses template discovery when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_source_files: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<serde_json::Value>,
}

impl FileSource {
    /// Number of grid slots in one file
    pub fn slots_per_file(&self) -> usize {
        (self.file_period.num_seconds() / SAMPLE_PERIOD_SECS) as usize
    }
}

/// Title plus the file source groups feeding one catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDescription {
    pub title: String,

    /// File source id to its ordered physical layouts
    pub file_source_groups: BTreeMap<String, Vec<FileSource>>,
}

/// Complete data source configuration keyed by catalog id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSourceConfig {
    pub catalogs: BTreeMap<String, CatalogDescription>,
}

impl DataSourceConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            WindCubeError::configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let config = Self::from_json(&data)?;
        debug!(
            "Loaded {} catalog(s) from {}",
            config.catalogs.len(),
            path.display()
        );

        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)
            .map_err(|e| WindCubeError::configuration(format!("JSON parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check catalog ids and file source periods
    pub fn validate(&self) -> Result<()> {
        for (catalog_id, description) in &self.catalogs {
            if !catalog_id.starts_with('/') || catalog_id.len() < 2 {
                return Err(WindCubeError::configuration(format!(
                    "Catalog id '{}' must be an absolute path",
                    catalog_id
                )));
            }

            for (file_source_id, file_sources) in &description.file_source_groups {
                for file_source in file_sources {
                    let secs = file_source.file_period.num_seconds();
                    if secs <= 0 || secs % SAMPLE_PERIOD_SECS != 0 {
                        return Err(WindCubeError::configuration(format!(
                            "File period of '{}' in '{}' must be a positive multiple of 10 minutes",
                            file_source_id, catalog_id
                        )));
                    }

                    if file_source.catalog_source_files.is_none()
                        && file_source.file_name_template.is_empty()
                    {
                        return Err(WindCubeError::configuration(format!(
                            "File source '{}' in '{}' has neither a file name template nor explicit files",
                            file_source_id, catalog_id
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Look up a catalog description
    pub fn catalog(&self, catalog_id: &str) -> Result<&CatalogDescription> {
        self.catalogs
            .get(catalog_id)
            .ok_or_else(|| WindCubeError::CatalogNotFound {
                catalog_id: catalog_id.to_string(),
            })
    }

    /// Install the process-wide configuration. Fails if already installed.
    pub fn init_global(config: DataSourceConfig) -> Result<&'static DataSourceConfig> {
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| WindCubeError::configuration("Configuration already initialized"))?;

        Self::global()
    }

    /// The process-wide configuration installed by [`DataSourceConfig::init_global`]
    pub fn global() -> Result<&'static DataSourceConfig> {
        GLOBAL_CONFIG
            .get()
            .ok_or_else(|| WindCubeError::configuration("Configuration not initialized"))
    }
}

/// Serde adapter for `[-][d.]hh:mm:ss` duration strings
pub mod timespan {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).ok_or_else(|| de::Error::custom(format!("invalid duration '{}'", text)))
    }

    /// Parse `[-][d.]hh:mm:ss`
    pub fn parse(text: &str) -> Option<TimeDelta> {
        let text = text.trim();
        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let (days, clock) = match text.split_once('.') {
            Some((days, clock)) => (days.parse::<i64>().ok()?, clock),
            None => (0, text),
        };

        let mut parts = clock.split(':');
        let hours = parts.next()?.parse::<i64>().ok()?;
        let minutes = parts.next()?.parse::<i64>().ok()?;
        let seconds = parts.next()?.parse::<i64>().ok()?;
        if parts.next().is_some() || hours > 23 || minutes > 59 || seconds > 59 {
            return None;
        }

        let total = ((days * 24 + hours) * 60 + minutes) * 60 + seconds;
        TimeDelta::try_seconds(if negative { -total } else { total })
    }

    pub fn format(value: &TimeDelta) -> String {
        let total = value.num_seconds();
        let sign = if total < 0 { "-" } else { "" };
        let total = total.abs();
        let days = total / 86_400;
        let clock = format!(
            "{:02}:{:02}:{:02}",
            (total % 86_400) / 3600,
            (total % 3600) / 60,
            total % 60
        );

        if days > 0 {
            format!("{}{}.{}", sign, days, clock)
        } else {
            format!("{}{}", sign, clock)
        }
    }
}
