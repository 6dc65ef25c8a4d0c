use crate::generator::Generator;
use crate::parser::ProjectMetadata;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Generate a Swagger 2.0 document from model metadata and route tables
#[derive(Parser, Debug)]
#[command(name = "openapi-from-models")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Metadata manifest, or a directory of manifests
    #[arg(value_name = "METADATA_PATH")]
    pub metadata_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Report routes that have no documented operation
    #[arg(long = "development")]
    pub development: bool,

    /// Host written to the document, overriding the manifest and $HOST
    #[arg(long = "host", value_name = "HOST")]
    pub host: Option<String>,

    /// API title, overriding the manifest
    #[arg(long = "title", value_name = "TITLE")]
    pub title: Option<String>,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.metadata_path.exists() {
        anyhow::bail!(
            "Metadata path does not exist: {}",
            args.metadata_path.display()
        );
    }

    info!("Metadata path: {}", args.metadata_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Loading metadata...");
    let mut metadata = ProjectMetadata::load(&args.metadata_path)?;

    if args.development {
        metadata.api.development = true;
    }
    if let Some(host) = args.host {
        metadata.api.host = Some(host);
    }
    if let Some(title) = args.title {
        metadata.api.title = title;
    }

    let generator = Generator::new(
        &metadata.api,
        &metadata.resources,
        &metadata.models,
        &metadata.routes,
    )
    .context("Invalid resource configuration")?;
    let output = generator.generate();

    if !output.diagnostics.is_empty() {
        warn!("Generation finished with {} warnings", output.diagnostics.len());
    }

    info!("Serializing document...");
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&output.document)?,
        OutputFormat::Json => serialize_json(&output.document)?,
    };

    match args.output_path {
        Some(path) => {
            write_to_file(&content, &path)?;
            info!("Document written to {}", path.display());
        }
        None => println!("{}", content),
    }

    Ok(())
}
