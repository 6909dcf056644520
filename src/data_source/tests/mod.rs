//! Integration tests for the data source
//!
//! Tests run against WindCube file trees written to temporary directories.

pub mod catalog_tests;
pub mod read_tests;

use crate::config::DataSourceConfig;
use crate::data_source::WindCubeDataSource;
use chrono::{NaiveDateTime, TimeDelta};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

pub const CATALOG_ID: &str = "/WINDCUBE/SITE1";

/// Two daily file sources: `sta` with one file per day and `rtd` listing explicit files
pub fn test_config() -> DataSourceConfig {
    DataSourceConfig::from_json(
        r#"{
            "/WINDCUBE/SITE1": {
                "title": "WindCube at site 1",
                "fileSourceGroups": {
                    "sta": [
                        {
                            "pathSegments": ["DATA", "%Y-%m"],
                            "fileNameTemplate": "WLS7-0123_%Y_%m_%d*.sta",
                            "filePeriod": "1.00:00:00",
                            "utcOffset": "00:00:00"
                        }
                    ]
                }
            }
        }"#,
    )
    .unwrap()
}

/// Write a daily `.sta` file for `day` (`YYYY-MM-DD`) with one row per value.
///
/// `None` values leave the row out entirely.
pub fn write_sta_file(temp_dir: &TempDir, day: &str, pressure: &[Option<f64>]) {
    let begin = NaiveDateTime::parse_from_str(&format!("{} 00:00", day), "%Y-%m-%d %H:%M").unwrap();
    let directory = temp_dir
        .path()
        .join("DATA")
        .join(begin.format("%Y-%m").to_string());
    fs::create_dir_all(&directory).unwrap();

    let mut content = String::from("HeaderSize=2\nID System=WLS7-0123\nAltitudes (m)=40 60 80\n");
    content.push_str("Timestamp\tPressure (hPa)\tWind Speed (60m) (m/s)\t \n");
    for (row, value) in pressure.iter().enumerate() {
        if let Some(value) = value {
            let end = begin + TimeDelta::minutes(10 * (row as i64 + 1));
            content.push_str(&format!(
                "{}\t{}\t{}\t\n",
                end.format("%Y/%m/%d %H:%M"),
                value,
                value / 100.0
            ));
        }
    }

    let name = format!("WLS7-0123_{}_00-00-00.sta", begin.format("%Y_%m_%d"));
    fs::write(directory.join(name), content).unwrap();
}

pub fn data_source(temp_dir: &TempDir) -> WindCubeDataSource {
    WindCubeDataSource::with_template_discovery(Arc::new(test_config()), temp_dir.path())
        .with_concurrency(2)
}
