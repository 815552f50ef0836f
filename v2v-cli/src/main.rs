//! # v2v
//!
//! Builds the destination specs for a source VM from a plan configuration
//! and an inventory snapshot.
//!
//! ## Usage
//! ```bash
//! v2v --config plan.yaml --inventory snapshot.yaml plan vm-123
//! v2v --config plan.yaml -o json machine web --by-name
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use v2v_builder::Builder;
use v2v_cli::commands::execute;
use v2v_cli::{load_snapshot, Args, Config};

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::load(config_path)?.with_cli_overrides(&args),
        None => Config::default_with_cli(&args),
    };

    // Initialize logging
    v2v_common::init_logging(&config.logging.level, config.logging.format)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        namespace = %config.plan.namespace,
        storage_pairs = config.plan.storage_map.len(),
        network_pairs = config.plan.network_map.len(),
        "Starting v2v"
    );

    let inventory = config
        .inventory
        .as_deref()
        .context("No inventory snapshot given (use --inventory or `inventory:` in the config)")?;
    let parts = load_snapshot(inventory)?
        .into_parts()
        .context("Failed to index inventory snapshot")?;

    let mut builder = Builder::new(
        config.plan.clone(),
        parts.source,
        parts.destination,
        parts.catalog,
    );
    builder.load()?;

    match execute(&builder, &args.command, &config, args.output) {
        Ok(document) => {
            print!("{}", document);
            if !document.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Build failed");
            Err(e)
        }
    }
}
