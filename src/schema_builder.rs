use crate::generator::{Diagnostic, DiagnosticKind};
use crate::model::{AssociationDescriptor, Cardinality, ModelDefinition};
use crate::registry::ModelMetadataProvider;
use crate::type_mapper::TypeMapper;
use crate::validators;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Default number of association levels expanded below a resource.
pub const DEFAULT_MAX_ASSOCIATION_DEPTH: usize = 1;

/// Swagger 2.0 Schema object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to another definition
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "double", "date-time")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Properties for object types, in column order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

impl Schema {
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    pub fn formatted(schema_type: &str, format: &str, default: Option<Value>) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            format: Some(format.to_string()),
            default,
            ..Self::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    pub fn object(properties: IndexMap<String, Schema>, required: Vec<String>) -> Self {
        Self {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            required: if required.is_empty() { None } else { Some(required) },
            ..Self::default()
        }
    }

    /// `$ref` to a named definition
    pub fn reference(definition: &str) -> Self {
        Self {
            reference: Some(format!("#/definitions/{}", definition)),
            ..Self::default()
        }
    }

    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.as_ref().and_then(|p| p.get(name))
    }
}

/// Which shape of a model to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Write shape: writable fields only, no read associations
    pub input_mode: bool,
    /// In input mode, keep only required fields
    pub required_only: bool,
}

/// The two definitions emitted for every resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDefinitions {
    pub read_name: String,
    pub read: Schema,
    pub input_name: String,
    pub input: Schema,
}

/// Model schema builder - composes the type mapper and validator aggregation across a
/// model's columns and associations.
pub struct SchemaBuilder<'a, P: ModelMetadataProvider + ?Sized> {
    provider: &'a P,
    max_depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, P: ModelMetadataProvider + ?Sized> SchemaBuilder<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        debug!("Initializing SchemaBuilder");
        Self {
            provider,
            max_depth: DEFAULT_MAX_ASSOCIATION_DEPTH,
            diagnostics: Vec::new(),
        }
    }

    /// Sets how many association levels are expanded. 0 disables association properties.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Renders `model` in read or input shape with default options.
    pub fn build(&mut self, model: &ModelDefinition, input_mode: bool) -> Schema {
        self.build_with(
            model,
            BuildOptions {
                input_mode,
                required_only: false,
            },
        )
    }

    pub fn build_with(&mut self, model: &ModelDefinition, options: BuildOptions) -> Schema {
        let mut path = vec![model.name.clone()];
        if options.input_mode {
            self.input_schema(model, options.required_only, 0, &mut path)
        } else {
            self.read_schema(model, 0, &mut path)
        }
    }

    /// Builds `{resource_name}` and `{resource_name}Input`.
    ///
    /// The input definition wraps the write shape under the resource's snake_case name,
    /// matching the request envelope the CRUD endpoints expect.
    pub fn resource_definitions(
        &mut self,
        resource_name: &str,
        model: &ModelDefinition,
    ) -> ResourceDefinitions {
        debug!("Building definitions for {} ({})", resource_name, model.name);

        let read = self.build(model, false);
        let input_body = self.build(model, true);

        let mut envelope = IndexMap::new();
        envelope.insert(property_name(resource_name), input_body);

        ResourceDefinitions {
            read_name: resource_name.to_string(),
            read,
            input_name: format!("{}Input", resource_name),
            input: Schema::object(envelope, Vec::new()),
        }
    }

    /// Non-fatal conditions met so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn read_schema(
        &mut self,
        model: &ModelDefinition,
        depth: usize,
        path: &mut Vec<String>,
    ) -> Schema {
        let required: Vec<String> = validators::required_fields(model)
            .into_iter()
            .filter(|field| !model.is_hidden(field))
            .collect();

        let mut properties = IndexMap::new();
        for column in &model.columns {
            let name = column.name.as_str();
            if model.is_hidden(name) {
                continue;
            }
            // write-only attributes only appear in input shapes, unless also read-only
            if model.is_write_only(name) && !model.is_read_only(name) {
                continue;
            }
            let mut property = self.column_property(model, name);
            if model.is_read_only(name) {
                property.read_only = Some(true);
            }
            properties.insert(name.to_string(), property);
        }

        if depth < self.max_depth {
            for association in &model.associations {
                let Some(target) = self.resolve(model, association) else {
                    continue;
                };
                if path.contains(&target.name) {
                    debug!(
                        "Not expanding {}.{}: {} is already being rendered",
                        model.name, association.name, target.name
                    );
                    continue;
                }
                path.push(target.name.clone());
                let nested = self.read_schema(target, depth + 1, path);
                path.pop();

                let property = match association.cardinality {
                    Cardinality::Many => Schema::array(nested),
                    Cardinality::One => nested,
                };
                properties.insert(association.name.clone(), property);
            }
        }

        Schema::object(properties, required)
    }

    fn input_schema(
        &mut self,
        model: &ModelDefinition,
        required_only: bool,
        depth: usize,
        path: &mut Vec<String>,
    ) -> Schema {
        let writable = model.writable_fields();
        let required: Vec<String> = validators::required_fields(model)
            .into_iter()
            .filter(|field| writable.contains(&field.as_str()))
            .collect();

        let mut properties = IndexMap::new();
        for name in &writable {
            if required_only && !required.iter().any(|r| r == name) {
                continue;
            }
            let property = if model.column(name).is_some() {
                self.column_property(model, name)
            } else {
                // virtual attribute, e.g. a password accepted but never stored as-is
                let mut property = Schema::typed("string");
                validators::aggregate(model, name).apply_to(&mut property);
                property
            };
            properties.insert(name.to_string(), property);
        }

        if !required_only && depth < self.max_depth {
            for association in model.associations.iter().filter(|a| a.accepts_nested_writes()) {
                let Some(target) = self.resolve(model, association) else {
                    continue;
                };
                if path.contains(&target.name) {
                    debug!(
                        "Not expanding {}.{}_attributes: {} is already being rendered",
                        model.name, association.name, target.name
                    );
                    continue;
                }
                path.push(target.name.clone());
                let nested = self.input_schema(target, false, depth + 1, path);
                path.pop();

                let property = match association.cardinality {
                    Cardinality::Many => Schema::array(nested),
                    Cardinality::One => nested,
                };
                properties.insert(format!("{}_attributes", association.name), property);
            }
        }

        Schema::object(properties, required)
    }

    fn column_property(&mut self, model: &ModelDefinition, name: &str) -> Schema {
        let Some(column) = model.column(name) else {
            return Schema::typed("string");
        };
        let mapped = TypeMapper::map(column);
        if let Some(warning) = mapped.warning {
            self.record(Diagnostic::new(DiagnosticKind::UnknownColumnType, warning));
        }
        let mut property = mapped.schema;
        // validators last: only_integer may override the mapped type
        validators::aggregate(model, name).apply_to(&mut property);
        property
    }

    /// Looks up an association's target. Unknown targets and targets whose table is not
    /// provisioned yet are skipped with a diagnostic.
    fn resolve(
        &mut self,
        model: &ModelDefinition,
        association: &AssociationDescriptor,
    ) -> Option<&'a ModelDefinition> {
        let provider: &'a P = self.provider;
        match provider.model(&association.target_model) {
            Some(target) if !target.table_provisioned => {
                self.record(Diagnostic::new(
                    DiagnosticKind::TableNotProvisioned,
                    format!(
                        "{}.{}: table for {} is not provisioned; association skipped",
                        model.name, association.name, target.name
                    ),
                ));
                None
            }
            Some(target) => Some(target),
            None => {
                self.record(Diagnostic::new(
                    DiagnosticKind::UnresolvedAssociation,
                    format!(
                        "{}.{} refers to unknown model {}; association skipped",
                        model.name, association.name, association.target_model
                    ),
                ));
                None
            }
        }
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            diagnostic.log();
            self.diagnostics.push(diagnostic);
        }
    }
}

/// snake_case form of a resource name, used as the request envelope key.
pub fn property_name(resource_name: &str) -> String {
    let mut out = String::with_capacity(resource_name.len() + 4);
    for (i, c) in resource_name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == ':' || c == '/' || c == ' ' || c == '-' {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }
    out
}
