//! WindCube Reader Library
//!
//! A Rust library for reading WindCube lidar export files as time-indexed
//! resources on a fixed 10-minute sampling grid.
//!
//! This library provides tools for:
//! - Parsing the header line count and tab-separated column header of a file
//! - Normalizing free-text column labels into validated resource ids
//! - Building resource catalogs from configured file sources
//! - Estimating how much of a day of samples a file contains
//! - Reading channels into caller-owned, time-aligned buffers

pub mod availability;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod data_source;
pub mod discovery;
pub mod error;
pub mod header;
pub mod label;
pub mod models;
pub mod reader;

// Re-export commonly used types
pub use catalog::CatalogBuilder;
pub use config::{CatalogDescription, DataSourceConfig, FileSource};
pub use data_source::WindCubeDataSource;
pub use discovery::{FileDiscovery, TemplateFileDiscovery};
pub use error::{Result, WindCubeError};
pub use models::{ReadResult, Resource, ResourceCatalog};
pub use reader::{ReadRequest, read_file};
