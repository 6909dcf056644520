//! Data source facade over WindCube catalogs.
//!
//! Ties configuration, file discovery, catalog building, availability
//! estimation and time-aligned reading together behind async operations.
//! All file work runs on the blocking pool, independent files concurrently.

#[cfg(test)]
pub mod tests;

use crate::availability::estimate_availability;
use crate::catalog::CatalogBuilder;
use crate::config::{DataSourceConfig, FileSource};
use crate::constants::{ELEMENT_SIZE, SAMPLE_PERIOD_SECS};
use crate::discovery::{FileDiscovery, TemplateFileDiscovery};
use crate::error::{Result, WindCubeError};
use crate::models::{ReadResult, ResourceCatalog};
use crate::reader::{ReadRequest, decode_value, read_file};

use chrono::{DateTime, TimeDelta, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Samples of one file period as produced by the reader
struct FileSamples {
    file_begin: DateTime<Utc>,
    data: Vec<u8>,
    status: Vec<u8>,
}

/// Async access to the catalogs of one data root
pub struct WindCubeDataSource {
    config: Arc<DataSourceConfig>,
    root: PathBuf,
    discovery: Arc<dyn FileDiscovery>,
    concurrency: usize,
}

impl WindCubeDataSource {
    pub fn new(
        config: Arc<DataSourceConfig>,
        root: impl Into<PathBuf>,
        discovery: Arc<dyn FileDiscovery>,
    ) -> Self {
        Self {
            config,
            root: root.into(),
            discovery,
            concurrency: num_cpus::get().max(1),
        }
    }

    /// Data source using template discovery below `root`
    pub fn with_template_discovery(config: Arc<DataSourceConfig>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let discovery = Arc::new(TemplateFileDiscovery::new(root.clone()));
        Self::new(config, root, discovery)
    }

    /// Data source over the process-wide configuration, using template discovery
    pub fn from_global(root: impl Into<PathBuf>) -> Result<Self> {
        let config = DataSourceConfig::global()?.clone();
        Ok(Self::with_template_discovery(Arc::new(config), root))
    }

    /// Limit the number of files processed at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_ids(&self) -> Vec<&str> {
        self.config.catalogs.keys().map(String::as_str).collect()
    }

    /// Build the resource catalog for `catalog_id`
    pub async fn get_catalog(
        &self,
        catalog_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ResourceCatalog> {
        let description = self.config.catalog(catalog_id)?.clone();
        let root = self.root.clone();
        let discovery = self.discovery.clone();
        let catalog_id = catalog_id.to_string();
        let cancel = cancel.clone();

        task::spawn_blocking(move || {
            CatalogBuilder::new(&root, discovery.as_ref()).build(&catalog_id, &description, &cancel)
        })
        .await?
    }

    /// Mean availability of every file period overlapping `[begin, end)`
    pub async fn get_availability(
        &self,
        catalog_id: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64> {
        validate_window(begin, end)?;
        let description = self.config.catalog(catalog_id)?;

        let jobs: Vec<(FileSource, DateTime<Utc>)> = description
            .file_source_groups
            .values()
            .flatten()
            .flat_map(|file_source| {
                file_periods(file_source.file_period, begin, end)
                    .into_iter()
                    .map(move |file_begin| (file_source.clone(), file_begin))
            })
            .collect();

        if jobs.is_empty() {
            return Ok(0.0);
        }

        let job_count = jobs.len();
        let availabilities: Vec<f64> = stream::iter(jobs)
            .map(|(file_source, file_begin)| {
                let discovery = self.discovery.clone();
                async move {
                    task::spawn_blocking(move || -> Result<f64> {
                        match discovery.resolve_for(&file_source, file_begin)? {
                            Some(path) => estimate_availability(&path),
                            None => {
                                debug!("No file for period starting {}", file_begin);
                                Ok(0.0)
                            }
                        }
                    })
                    .await?
                }
            })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        Ok(availabilities.iter().sum::<f64>() / job_count as f64)
    }

    /// Read a resource addressed as `/CATALOG/ID/resource_id` over `[begin, end)`
    pub async fn read(
        &self,
        resource_path: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<ReadResult> {
        validate_window(begin, end)?;

        let (catalog_id, resource_id) = split_resource_path(resource_path)?;
        let catalog = self.get_catalog(catalog_id, cancel).await?;
        let resource = catalog
            .find(resource_id)
            .ok_or_else(|| WindCubeError::ResourceNotFound {
                path: resource_path.to_string(),
            })?;

        let file_sources = self
            .config
            .catalog(catalog_id)?
            .file_source_groups
            .get(&resource.file_source_id)
            .cloned()
            .unwrap_or_default();

        let jobs: Vec<(FileSource, DateTime<Utc>)> = file_sources
            .iter()
            .flat_map(|file_source| {
                file_periods(file_source.file_period, begin, end)
                    .into_iter()
                    .map(move |file_begin| (file_source.clone(), file_begin))
            })
            .collect();

        let original_name = Arc::new(resource.original_name.clone());
        let files: Vec<Option<FileSamples>> = stream::iter(jobs)
            .map(|(file_source, file_begin)| {
                let discovery = self.discovery.clone();
                let original_name = original_name.clone();
                let cancel = cancel.clone();
                async move {
                    task::spawn_blocking(move || {
                        read_file_period(
                            discovery.as_ref(),
                            &file_source,
                            file_begin,
                            &original_name,
                            &cancel,
                        )
                    })
                    .await?
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let slot_count = slots_between(begin, end);
        let mut result = ReadResult {
            begin,
            data: vec![0.0; slot_count],
            status: vec![0; slot_count],
        };

        for samples in files.into_iter().flatten() {
            copy_into_window(&samples, &mut result);
        }

        debug!(
            "Read {}: {} of {} slots present",
            resource_path,
            result.status.iter().filter(|&&s| s == 1).count(),
            slot_count
        );

        Ok(result)
    }
}

/// Locate and read the file of one period into freshly allocated buffers
fn read_file_period(
    discovery: &dyn FileDiscovery,
    file_source: &FileSource,
    file_begin: DateTime<Utc>,
    original_name: &str,
    cancel: &CancellationToken,
) -> Result<Option<FileSamples>> {
    if cancel.is_cancelled() {
        return Err(WindCubeError::Cancelled);
    }

    let Some(path) = discovery.resolve_for(file_source, file_begin)? else {
        warn!("No file found for period starting {}", file_begin);
        return Ok(None);
    };

    let slot_count = file_source.slots_per_file();
    let mut data = vec![0u8; slot_count * ELEMENT_SIZE];
    let mut status = vec![0u8; slot_count];
    read_file(
        &path,
        file_begin,
        &mut [ReadRequest::new(original_name, &mut data, &mut status)],
    )?;

    Ok(Some(FileSamples {
        file_begin,
        data,
        status,
    }))
}

/// Copy present file slots into the window, earlier file sources take precedence
fn copy_into_window(samples: &FileSamples, result: &mut ReadResult) {
    let offset = (samples.file_begin - result.begin).num_seconds() / SAMPLE_PERIOD_SECS;
    let cells = samples.data.chunks_exact(ELEMENT_SIZE);

    for (file_slot, (cell, &status)) in cells.zip(&samples.status).enumerate() {
        if status != 1 {
            continue;
        }

        let target = offset + file_slot as i64;
        if target < 0 || target as usize >= result.status.len() {
            continue;
        }

        let target = target as usize;
        if result.status[target] == 1 {
            continue;
        }

        if let Some(value) = decode_value(cell) {
            result.data[target] = value;
            result.status[target] = 1;
        }
    }
}

/// Begins of every file period overlapping `[begin, end)`, aligned to the epoch
pub fn file_periods(
    file_period: TimeDelta,
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let period = file_period.num_seconds();
    if period <= 0 {
        return Vec::new();
    }

    let first = begin.timestamp().div_euclid(period) * period;
    (first..end.timestamp())
        .step_by(period as usize)
        .filter_map(|seconds| DateTime::from_timestamp(seconds, 0))
        .collect()
}

fn slots_between(begin: DateTime<Utc>, end: DateTime<Utc>) -> usize {
    ((end - begin).num_seconds() / SAMPLE_PERIOD_SECS) as usize
}

fn validate_window(begin: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end <= begin {
        return Err(WindCubeError::configuration(format!(
            "Window end {} must be after begin {}",
            end, begin
        )));
    }

    let on_grid = |time: DateTime<Utc>| {
        time.timestamp().rem_euclid(SAMPLE_PERIOD_SECS) == 0 && time.timestamp_subsec_nanos() == 0
    };
    if !on_grid(begin) || !on_grid(end) {
        return Err(WindCubeError::configuration(format!(
            "Window {} - {} is not aligned to the 10 minute grid",
            begin, end
        )));
    }

    Ok(())
}

/// Split `/CATALOG/ID/resource_id` into catalog id and resource id
pub fn split_resource_path(resource_path: &str) -> Result<(&str, &str)> {
    match resource_path.rsplit_once('/') {
        Some((catalog_id, resource_id)) if !catalog_id.is_empty() && !resource_id.is_empty() => {
            Ok((catalog_id, resource_id))
        }
        _ => Err(WindCubeError::ResourceNotFound {
            path: resource_path.to_string(),
        }),
    }
}
