use crate::config::{ApiConfig, ResourceConfig};
use crate::error::Error;
use crate::model::ModelDefinition;
use crate::registry::ModelRegistry;
use crate::routes::console::parse_routes_table;
use crate::routes::{RawRoute, RouteTable};
use crate::scanner::FileScanner;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata manifest parser.
///
/// A manifest is a YAML or JSON document holding any of the sections below. Larger
/// projects usually split them across files (one per model, one for the route listing)
/// and point the generator at the directory.
///
/// ```yaml
/// api:
///   title: Blog API
/// resources:
///   - { controller: articles, model: Article, collection_name: Articles }
/// models:
///   - name: Article
///     columns:
///       - { name: title, type: string }
/// routes:
///   - { controller: articles, verb: GET, path: "/api/articles(.:format)", action: index }
/// ```
pub struct MetadataParser;

/// One parsed manifest file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub api: Option<ApiConfig>,
    pub resources: Vec<ResourceConfig>,
    pub models: Vec<ModelDefinition>,
    pub routes: Vec<RawRoute>,
    /// Raw route listing as printed by the framework's routes command
    pub routes_table: Option<String>,
}

/// Input format of a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    /// `.json` files are JSON, anything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ManifestFormat::Json,
            _ => ManifestFormat::Yaml,
        }
    }
}

impl MetadataParser {
    /// Parses manifest text.
    pub fn parse_str(content: &str, format: ManifestFormat) -> crate::error::Result<Manifest> {
        // an empty YAML document is an empty manifest
        if content.trim().is_empty() {
            return Ok(Manifest::default());
        }
        let manifest: Manifest = match format {
            ManifestFormat::Yaml => serde_yaml::from_str(content)?,
            ManifestFormat::Json => serde_json::from_str(content)?,
        };
        Ok(manifest)
    }

    /// Reads and parses one manifest file.
    pub fn parse_file(path: &Path) -> Result<Manifest> {
        debug!("Parsing manifest: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

        let manifest = Self::parse_str(&content, ManifestFormat::from_path(path)).map_err(|e| {
            Error::Parse {
                file: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        debug!(
            "Parsed {}: {} resources, {} models, {} routes",
            path.display(),
            manifest.resources.len(),
            manifest.models.len(),
            manifest.routes.len()
        );
        Ok(manifest)
    }

    /// Parses several manifests; failures are logged and returned in place.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<(PathBuf, Manifest)>> {
        debug!("Parsing {} manifests", paths.len());

        let results: Vec<Result<(PathBuf, Manifest)>> = paths
            .iter()
            .map(|path| match Self::parse_file(path) {
                Ok(manifest) => Ok((path.clone(), manifest)),
                Err(e) => {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                    Err(e)
                }
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );
        results
    }
}

/// Everything a generation pass reads, merged from one or more manifests.
#[derive(Debug, Default)]
pub struct ProjectMetadata {
    pub api: ApiConfig,
    pub resources: Vec<ResourceConfig>,
    pub models: ModelRegistry,
    pub routes: RouteTable,
}

impl ProjectMetadata {
    /// Loads a manifest file, or every manifest below a directory.
    ///
    /// Any manifest that fails to parse aborts loading; a partially merged model set
    /// would only surface later as confusing unknown-model errors.
    pub fn load(path: &Path) -> Result<Self> {
        let files = if path.is_dir() {
            let scan = FileScanner::new(path.to_path_buf())
                .scan()
                .with_context(|| format!("Failed to scan {}", path.display()))?;
            scan.manifest_files
        } else {
            vec![path.to_path_buf()]
        };

        if files.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "no metadata manifests found in {}",
                path.display()
            ))
            .into());
        }

        let manifests = MetadataParser::parse_files(&files)
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        Self::from_manifests(manifests)
    }

    /// Merges parsed manifests in the given order.
    ///
    /// Resources, routes and models accumulate. A model name seen twice is an error. When
    /// several manifests carry an `api` section, the last one wins.
    pub fn from_manifests(manifests: Vec<(PathBuf, Manifest)>) -> Result<Self> {
        let mut metadata = ProjectMetadata::default();
        let mut api_source: Option<PathBuf> = None;

        for (path, manifest) in manifests {
            if let Some(api) = manifest.api {
                if let Some(previous) = &api_source {
                    warn!(
                        "{} overrides the api section of {}",
                        path.display(),
                        previous.display()
                    );
                }
                metadata.api = api;
                api_source = Some(path.clone());
            }

            metadata.resources.extend(manifest.resources);

            for model in manifest.models {
                metadata
                    .models
                    .register(model)
                    .with_context(|| format!("Invalid model in {}", path.display()))?;
            }

            metadata.routes.extend(manifest.routes);
            if let Some(table) = manifest.routes_table {
                metadata.routes.extend(parse_routes_table(&table));
            }
        }

        info!(
            "Loaded {} resources, {} models and {} routes",
            metadata.resources.len(),
            metadata.models.len(),
            metadata.routes.len()
        );
        Ok(metadata)
    }
}
