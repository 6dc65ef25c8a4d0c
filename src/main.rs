//! openapi-from-models - command-line front end.
//!
//! Reads model metadata, resource declarations and route tables from YAML or JSON
//! manifests and writes the derived Swagger 2.0 document.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-models [OPTIONS] <METADATA_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! openapi-from-models ./api-metadata -o swagger.yaml
//! ```
//!
//! Generate JSON and report undocumented custom routes:
//! ```bash
//! openapi-from-models ./api-metadata -f json -o public/api/swagger.json --development
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_models::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // RUST_LOG, when set, takes precedence over the flag
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("openapi-from-models starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
