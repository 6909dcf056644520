//! Windowed reads through the data source

use super::*;
use crate::data_source::{file_periods, split_resource_path};
use crate::error::WindCubeError;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

const PRESSURE: &str = "/WINDCUBE/SITE1/WC_Pressure";

fn time(text: &str) -> DateTime<Utc> {
    text.parse().unwrap()
}

#[tokio::test]
async fn test_read_full_day() {
    let temp_dir = TempDir::new().unwrap();
    let values: Vec<_> = (0..54).map(|i| Some(1000.0 + i as f64)).collect();
    write_sta_file(&temp_dir, "2020-10-08", &values);

    let result = data_source(&temp_dir)
        .read(
            PRESSURE,
            time("2020-10-08T00:00:00Z"),
            time("2020-10-09T00:00:00Z"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.data.len(), 144);
    assert_eq!(result.data[0], 1000.0);
    assert_eq!(result.data[53], 1053.0);
    assert_eq!(result.data[54], 0.0);
    assert!(result.status[..54].iter().all(|&s| s == 1));
    assert!(result.status[54..].iter().all(|&s| s == 0));
}

#[tokio::test]
async fn test_read_across_two_files() {
    let temp_dir = TempDir::new().unwrap();
    write_sta_file(&temp_dir, "2020-10-07", &vec![Some(1.0); 144]);
    write_sta_file(&temp_dir, "2020-10-08", &vec![Some(2.0); 144]);

    let result = data_source(&temp_dir)
        .read(
            PRESSURE,
            time("2020-10-07T23:00:00Z"),
            time("2020-10-08T01:00:00Z"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.data.len(), 12);
    assert_eq!(result.data[..6], [1.0; 6]);
    assert_eq!(result.data[6..], [2.0; 6]);
    assert!(result.status.iter().all(|&s| s == 1));
    assert_eq!(result.slot_time(6), time("2020-10-08T00:00:00Z"));
}

#[tokio::test]
async fn test_read_with_gaps_and_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    write_sta_file(&temp_dir, "2020-10-08", &[Some(5.0), None, Some(7.0)]);

    let result = data_source(&temp_dir)
        .read(
            "/WINDCUBE/SITE1/WC_Wind_Speed_60m_",
            time("2020-10-08T00:00:00Z"),
            time("2020-10-10T00:00:00Z"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.data.len(), 288);
    assert_eq!(result.status[..3], [1, 0, 1]);
    assert_eq!(result.data[0], 0.05);
    assert_eq!(result.data[2], 0.07);
    assert!(result.status[144..].iter().all(|&s| s == 0));
    assert_eq!(result.present().count(), 2);
}

#[tokio::test]
async fn test_read_unknown_resource() {
    let temp_dir = TempDir::new().unwrap();
    write_sta_file(&temp_dir, "2020-10-08", &[Some(1.0)]);

    let result = data_source(&temp_dir)
        .read(
            "/WINDCUBE/SITE1/WC_Temperature",
            time("2020-10-08T00:00:00Z"),
            time("2020-10-09T00:00:00Z"),
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(WindCubeError::ResourceNotFound { .. })));
}

#[tokio::test]
async fn test_read_rejects_off_grid_window() {
    let temp_dir = TempDir::new().unwrap();

    let result = data_source(&temp_dir)
        .read(
            PRESSURE,
            time("2020-10-08T00:05:00Z"),
            time("2020-10-09T00:00:00Z"),
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(WindCubeError::Configuration { .. })));
}

#[tokio::test]
async fn test_read_propagates_numeric_errors() {
    let temp_dir = TempDir::new().unwrap();
    write_sta_file(&temp_dir, "2020-10-08", &[Some(1.0)]);

    let path = temp_dir
        .path()
        .join("DATA/2020-10/WLS7-0123_2020_10_08_00-00-00.sta");
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("2020/10/08 00:20\t1O.5\t0.1\t\n");
    fs::write(&path, content).unwrap();

    let result = data_source(&temp_dir)
        .read(
            PRESSURE,
            time("2020-10-08T00:00:00Z"),
            time("2020-10-09T00:00:00Z"),
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(WindCubeError::NumericFormat { .. })));
}

#[test]
fn test_file_periods_are_epoch_aligned() {
    let periods = file_periods(
        TimeDelta::days(1),
        time("2020-10-07T23:00:00Z"),
        time("2020-10-08T01:00:00Z"),
    );

    assert_eq!(
        periods,
        vec![time("2020-10-07T00:00:00Z"), time("2020-10-08T00:00:00Z")]
    );
}

#[test]
fn test_file_periods_end_is_exclusive() {
    let periods = file_periods(
        TimeDelta::days(1),
        time("2020-10-08T00:00:00Z"),
        time("2020-10-09T00:00:00Z"),
    );

    assert_eq!(periods, vec![time("2020-10-08T00:00:00Z")]);
}

#[test]
fn test_split_resource_path() {
    assert_eq!(
        split_resource_path(PRESSURE).unwrap(),
        ("/WINDCUBE/SITE1", "WC_Pressure")
    );
    assert!(split_resource_path("WC_Pressure").is_err());
    assert!(split_resource_path("/WINDCUBE/SITE1/").is_err());
}

#[tokio::test]
async fn test_latin1_file_builds_catalog_and_reads() {
    let temp_dir = TempDir::new().unwrap();
    let directory = temp_dir.path().join("DATA").join("2020-10");
    fs::create_dir_all(&directory).unwrap();

    let mut content = b"HeaderSize=1\r\nID System=WLS7-0123\r\n".to_vec();
    content.extend_from_slice(b"Timestamp\tPressure (hPa)\tWind Direction (40m) (\xb0)\r\n");
    content.extend_from_slice(b"2020/10/08 00:10\t1013.2\t270\r\n");
    content.extend_from_slice(b"2020/10/08 00:20\t1013.1\t275.5\r\n");
    fs::write(directory.join("WLS7-0123_2020_10_08_00-00-00.sta"), content).unwrap();

    let source = data_source(&temp_dir);
    let catalog = source
        .get_catalog(CATALOG_ID, &CancellationToken::new())
        .await
        .unwrap();

    let direction = catalog.find("WC_Wind_Direction_40m_").unwrap();
    assert_eq!(direction.group, "40m");
    assert_eq!(direction.unit, "\u{FFFD}");

    let result = source
        .read(
            "/WINDCUBE/SITE1/WC_Wind_Direction_40m_",
            time("2020-10-08T00:00:00Z"),
            time("2020-10-08T01:00:00Z"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, vec![1, 1, 0, 0, 0, 0]);
    assert_eq!(result.data[..2], [270.0, 275.5]);

    let availability = source
        .get_availability(
            CATALOG_ID,
            time("2020-10-08T00:00:00Z"),
            time("2020-10-09T00:00:00Z"),
        )
        .await
        .unwrap();
    assert_eq!(availability, 2.0 / 144.0);
}
