//! One generation pass: model metadata and route tables in, Swagger document out.
//!
//! [`Generator::new`] checks the controller to model mapping up front and fails with
//! [`Error::UnknownModel`] when a resource names an unregistered model. Everything that
//! can go wrong after that only degrades the affected resource and is reported as a
//! [`Diagnostic`].

use crate::config::{ApiConfig, ResourceConfig};
use crate::crud_builder::{undocumented_routes, CrudOperationBuilder, SchemaNames};
use crate::document::{DocumentAssembler, SwaggerDocument};
use crate::error::{Error, Result};
use crate::model::ModelDefinition;
use crate::registry::ModelMetadataProvider;
use crate::routes::normalizer::normalize;
use crate::routes::RouteTableProvider;
use crate::schema_builder::SchemaBuilder;
use log::{debug, info, warn};
use std::fmt;

/// Category of a non-fatal generation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    UnknownColumnType,
    UnresolvedAssociation,
    TableNotProvisioned,
    MisconfiguredController,
    UndocumentedRoute,
}

/// A non-fatal problem met while generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn log(&self) {
        warn!("{}", self.message);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Result of a generation pass.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub document: SwaggerDocument,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Generator<'a, M, R>
where
    M: ModelMetadataProvider + ?Sized,
    R: RouteTableProvider + ?Sized,
{
    config: &'a ApiConfig,
    /// Each resource paired with its model, resolved once in [`Generator::new`]
    resources: Vec<(&'a ResourceConfig, &'a ModelDefinition)>,
    models: &'a M,
    routes: &'a R,
}

impl<'a, M, R> Generator<'a, M, R>
where
    M: ModelMetadataProvider + ?Sized,
    R: RouteTableProvider + ?Sized,
{
    pub fn new(
        config: &'a ApiConfig,
        resources: &'a [ResourceConfig],
        models: &'a M,
        routes: &'a R,
    ) -> Result<Self> {
        let resources = resources
            .iter()
            .map(|resource| match models.model(&resource.model) {
                Some(model) => Ok((resource, model)),
                None => Err(Error::UnknownModel {
                    controller: resource.controller.clone(),
                    model: resource.model.clone(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        debug!("Generator ready with {} resources", resources.len());
        Ok(Self {
            config,
            resources,
            models,
            routes,
        })
    }

    /// Runs the pass. Inputs are only read, so repeated calls yield identical output.
    pub fn generate(&self) -> GenerationOutput {
        info!("Generating document for {}", self.config.title);

        let mut assembler = DocumentAssembler::new(self.config);
        let mut schemas =
            SchemaBuilder::new(self.models).with_max_depth(self.config.max_association_depth);
        let mut diagnostics = Vec::new();

        for controller in self.controllers() {
            let Some(&(resource, model)) =
                self.resources.iter().find(|(r, _)| r.controller == controller)
            else {
                report(
                    &mut diagnostics,
                    Diagnostic::new(
                        DiagnosticKind::MisconfiguredController,
                        format!(
                            "{} is not configured as a resource and was left out of the document",
                            controller
                        ),
                    ),
                );
                continue;
            };
            assembler.add_tag(&resource.collection_name);
            self.document_resource(
                resource,
                model,
                &mut assembler,
                &mut schemas,
                &mut diagnostics,
            );
        }

        diagnostics.extend(schemas.into_diagnostics());
        let document = assembler.build();
        info!(
            "Generated {} paths and {} definitions ({} diagnostics)",
            document.paths.len(),
            document.definitions.len(),
            diagnostics.len()
        );

        GenerationOutput {
            document,
            diagnostics,
        }
    }

    /// Controllers to document, in tag order.
    fn controllers(&self) -> Vec<&'a str> {
        if self.config.controllers.is_empty() {
            self.resources.iter().map(|(r, _)| r.controller.as_str()).collect()
        } else {
            self.config.controllers.iter().map(String::as_str).collect()
        }
    }

    fn document_resource(
        &self,
        resource: &ResourceConfig,
        model: &ModelDefinition,
        assembler: &mut DocumentAssembler,
        schemas: &mut SchemaBuilder<'a, M>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        debug!("Documenting {} ({})", resource.controller, resource.model);

        if !model.table_provisioned {
            report(
                diagnostics,
                Diagnostic::new(
                    DiagnosticKind::TableNotProvisioned,
                    format!(
                        "{}: table for {} is not provisioned; resource skipped",
                        resource.controller, model.name
                    ),
                ),
            );
            return;
        }

        let definitions = schemas.resource_definitions(resource.resource_name(), model);
        let names = SchemaNames {
            resource: definitions.read_name.clone(),
            input: definitions.input_name.clone(),
        };
        assembler.add_definition(&definitions.read_name, definitions.read);
        assembler.add_definition(&definitions.input_name, definitions.input);

        let routes = normalize(&self.routes.routes_for(&resource.controller));
        let paths = CrudOperationBuilder::new(resource, &self.config.base_path)
            .searchable(model.searchable)
            .methods(&model.methods)
            .pagination(self.config.per_page_default, self.config.per_page_max)
            .build(&routes, &names);
        assembler.add_paths(paths);
        assembler.add_paths(resource.custom_operations.clone());

        if self.config.development {
            for diagnostic in undocumented_routes(&resource.controller, &routes, assembler) {
                report(diagnostics, diagnostic);
            }
        }
    }
}

fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    diagnostic.log();
    diagnostics.push(diagnostic);
}
