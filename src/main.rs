use anyhow::Context;
use clap::Parser;
use colored::*;
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use windcube_reader::availability::estimate_availability;
use windcube_reader::cli::{Args, Command};
use windcube_reader::{DataSourceConfig, WindCubeDataSource};

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancellation_token.cancel();
            } else {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = run(args.command, cancellation_token.clone()) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(windcube_reader::WindCubeError::Cancelled.into())
            }
        }
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

async fn run(command: Command, cancel: CancellationToken) -> anyhow::Result<()> {
    match command {
        Command::Catalog {
            config,
            root,
            catalog,
        } => {
            DataSourceConfig::init_global(DataSourceConfig::load(&config)?)?;
            let source = WindCubeDataSource::from_global(root)?;
            let catalog_ids: Vec<String> = match catalog {
                Some(id) => vec![id],
                None => source.catalog_ids().into_iter().map(String::from).collect(),
            };

            let mut catalogs = Vec::with_capacity(catalog_ids.len());
            for catalog_id in &catalog_ids {
                let catalog = source
                    .get_catalog(catalog_id, &cancel)
                    .await
                    .with_context(|| format!("Failed to build catalog {}", catalog_id))?;
                catalogs.push(catalog);
            }

            println!("{}", serde_json::to_string_pretty(&catalogs)?);
            println!(
                "{} {} catalog(s), {} resource(s)",
                "Built".bright_green().bold(),
                catalogs.len(),
                catalogs.iter().map(|c| c.resources.len()).sum::<usize>()
            );
        }

        Command::Availability { file } => {
            let availability = tokio::task::spawn_blocking(move || estimate_availability(&file))
                .await??;
            println!(
                "{} {:.1}%",
                "Availability:".bright_cyan(),
                availability * 100.0
            );
        }

        Command::Read {
            config,
            root,
            resource,
            begin,
            end,
        } => {
            DataSourceConfig::init_global(DataSourceConfig::load(&config)?)?;
            let source = WindCubeDataSource::from_global(root)?;
            let result = source
                .read(&resource, begin, end, &cancel)
                .await
                .with_context(|| format!("Failed to read {}", resource))?;

            for (time, value) in result.present() {
                println!("{}\t{}", time.to_rfc3339(), value);
            }

            let present = result.status.iter().filter(|&&s| s == 1).count();
            println!(
                "{} {} of {} slots present",
                "Read".bright_green().bold(),
                present.to_string().bright_white().bold(),
                result.status.len()
            );
        }
    }

    Ok(())
}
