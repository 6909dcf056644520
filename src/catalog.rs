//! Catalog building from WindCube file headers
//!
//! Every file source contributes the value columns of one representative
//! file. Columns are normalized into resources and merged by id. Any header
//! or naming failure aborts the whole build.

use crate::config::{CatalogDescription, FileSource};
use crate::constants::sample_period;
use crate::discovery::FileDiscovery;
use crate::error::{Result, WindCubeError};
use crate::header::read_header;
use crate::label::normalize_label;
use crate::models::{DataType, FileHeader, Resource, ResourceCatalog};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Builds resource catalogs from catalog descriptions
pub struct CatalogBuilder<'a> {
    root: &'a Path,
    discovery: &'a dyn FileDiscovery,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(root: &'a Path, discovery: &'a dyn FileDiscovery) -> Self {
        Self { root, discovery }
    }

    /// Build the catalog `catalog_id` from its description
    pub fn build(
        &self,
        catalog_id: &str,
        description: &CatalogDescription,
        cancel: &CancellationToken,
    ) -> Result<ResourceCatalog> {
        if cancel.is_cancelled() {
            return Err(WindCubeError::Cancelled);
        }

        let mut catalog = ResourceCatalog::new(catalog_id, &description.title);

        for (file_source_id, file_sources) in &description.file_source_groups {
            for file_source in file_sources {
                for path in self.resolve_paths(file_source)? {
                    let header = read_header(&path)?;
                    let resources = resources_from_header(&header, file_source_id)?;

                    debug!(
                        "{} contributed {} resource(s) to {}",
                        path.display(),
                        resources.len(),
                        catalog_id
                    );
                    catalog.merge(resources);
                }
            }
        }

        info!(
            "Built catalog {} with {} resource(s)",
            catalog_id,
            catalog.resources.len()
        );

        Ok(catalog)
    }

    /// Explicit files joined to the root, or the single discovered file
    fn resolve_paths(&self, file_source: &FileSource) -> Result<Vec<PathBuf>> {
        if let Some(files) = &file_source.catalog_source_files {
            return Ok(files.iter().map(|file| self.root.join(file)).collect());
        }

        Ok(self.discovery.resolve_first(file_source)?.into_iter().collect())
    }
}

/// Turn the non-blank value columns of a header into resources
pub fn resources_from_header(header: &FileHeader, file_source_id: &str) -> Result<Vec<Resource>> {
    header
        .value_columns()
        .filter(|(_, label)| !label.trim().is_empty())
        .map(|(_, label)| {
            let normalized = normalize_label(label)?;
            Ok(Resource {
                id: normalized.resource_id,
                unit: normalized.unit,
                group: normalized.group,
                file_source_id: file_source_id.to_string(),
                original_name: label.to_string(),
                sample_period: sample_period(),
                data_type: DataType::Float64,
            })
        })
        .collect()
}
