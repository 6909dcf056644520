//! Catalog building through the data source

use super::*;
use crate::error::WindCubeError;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_get_catalog() {
    let temp_dir = TempDir::new().unwrap();
    write_sta_file(&temp_dir, "2020-10-07", &[Some(1000.0)]);
    write_sta_file(&temp_dir, "2020-10-08", &[Some(1000.0)]);

    let source = data_source(&temp_dir);
    let catalog = source
        .get_catalog(CATALOG_ID, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(catalog.id, CATALOG_ID);
    assert_eq!(catalog.title, "WindCube at site 1");

    let ids: Vec<_> = catalog.resources.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["WC_Pressure", "WC_Wind_Speed_60m_"]);

    let wind = catalog.find("WC_Wind_Speed_60m_").unwrap();
    assert_eq!(wind.unit, "m/s");
    assert_eq!(wind.group, "60m");
    assert_eq!(wind.file_source_id, "sta");
    assert_eq!(wind.original_name, "Wind Speed (60m) (m/s)");
}

#[tokio::test]
async fn test_get_catalog_without_files_is_empty() {
    let temp_dir = TempDir::new().unwrap();

    let catalog = data_source(&temp_dir)
        .get_catalog(CATALOG_ID, &CancellationToken::new())
        .await
        .unwrap();

    assert!(catalog.resources.is_empty());
}

#[tokio::test]
async fn test_unknown_catalog() {
    let temp_dir = TempDir::new().unwrap();

    let result = data_source(&temp_dir)
        .get_catalog("/WINDCUBE/OTHER", &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(WindCubeError::CatalogNotFound { .. })));
}

#[tokio::test]
async fn test_catalog_ids() {
    let temp_dir = TempDir::new().unwrap();
    assert_eq!(data_source(&temp_dir).catalog_ids(), vec![CATALOG_ID]);
}

#[tokio::test]
async fn test_cancelled_catalog_build() {
    let temp_dir = TempDir::new().unwrap();
    write_sta_file(&temp_dir, "2020-10-08", &[Some(1000.0)]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = data_source(&temp_dir).get_catalog(CATALOG_ID, &cancel).await;
    assert!(matches!(result, Err(WindCubeError::Cancelled)));
}
