//! Command-line interface components.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "windcube")]
#[command(about = "Inspect and read WindCube lidar export files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build resource catalogs and print them as JSON
    Catalog {
        /// Data source configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Root directory of the data files
        #[arg(short, long)]
        root: PathBuf,

        /// Only build this catalog
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Estimate the availability of a single file
    Availability {
        /// WindCube file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Read a resource over a time window
    Read {
        /// Data source configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Root directory of the data files
        #[arg(short, long)]
        root: PathBuf,

        /// Resource path, e.g. /WINDCUBE/SITE1/WC_Pressure
        #[arg(long)]
        resource: String,

        /// Window begin (RFC 3339)
        #[arg(long)]
        begin: DateTime<Utc>,

        /// Window end (RFC 3339, exclusive)
        #[arg(long)]
        end: DateTime<Utc>,
    },
}
