use crate::config::{ApiConfig, SecurityDefinitionConfig};
use crate::routes::HttpMethod;
use crate::schema_builder::Schema;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub const SWAGGER_VERSION: &str = "2.0";
pub const JSON_MIME: &str = "application/json";
pub const CSV_MIME: &str = "text/csv";

/// Root document assembler - merges per-resource fragments with global metadata.
pub struct DocumentAssembler {
    info: Info,
    host: String,
    base_path: String,
    schemes: Vec<String>,
    security_definitions: IndexMap<String, SecurityDefinition>,
    tags: Vec<Tag>,
    /// Document under construction: path template -> PathItem
    paths: IndexMap<String, PathItem>,
    definitions: IndexMap<String, Schema>,
}

/// Swagger Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub description: String,
    pub version: String,
}

/// Swagger PathItem object - all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }

    pub fn set_operation(&mut self, method: HttpMethod, operation: Operation) {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
        };
        *slot = Some(operation);
    }

    /// Operations present on this path, in document order.
    pub fn operations(&self) -> Vec<(HttpMethod, &Operation)> {
        [
            HttpMethod::Get,
            HttpMethod::Put,
            HttpMethod::Post,
            HttpMethod::Delete,
            HttpMethod::Options,
            HttpMethod::Head,
            HttpMethod::Patch,
        ]
        .into_iter()
        .filter_map(|method| self.operation(method).map(|op| (method, op)))
        .collect()
    }

    /// Copies every operation of `other` into `self`, replacing same-method ones.
    pub fn merge(&mut self, other: PathItem) {
        for method in [
            HttpMethod::Get,
            HttpMethod::Put,
            HttpMethod::Post,
            HttpMethod::Delete,
            HttpMethod::Options,
            HttpMethod::Head,
            HttpMethod::Patch,
        ] {
            if let Some(operation) = other.operation(method) {
                self.set_operation(method, operation.clone());
            }
        }
    }
}

/// Swagger Operation object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    pub responses: IndexMap<String, Response>,
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
}

/// Swagger Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    /// Body parameters only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Parameter {
    /// Non-body parameter of a primitive type
    pub fn simple(name: &str, location: ParameterLocation, param_type: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            location,
            description: None,
            required,
            param_type: Some(param_type.to_string()),
            format: None,
            items: None,
            default: None,
            minimum: None,
            maximum: None,
            schema: None,
        }
    }

    pub fn body(name: &str, schema: Schema) -> Self {
        Self {
            name: name.to_string(),
            location: ParameterLocation::Body,
            description: None,
            required: true,
            param_type: None,
            format: None,
            items: None,
            default: None,
            minimum: None,
            maximum: None,
            schema: Some(schema),
        }
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn formatted(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }
}

/// Swagger Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Header>,
}

impl Response {
    pub fn new(description: &str, schema: Option<Schema>) -> Self {
        Self {
            description: description.to_string(),
            schema,
            headers: IndexMap::new(),
        }
    }
}

/// Swagger Header object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "type")]
    pub header_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Swagger Security Definition object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityDefinition {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<IndexMap<String, String>>,
}

impl From<&SecurityDefinitionConfig> for SecurityDefinition {
    fn from(config: &SecurityDefinitionConfig) -> Self {
        Self {
            scheme_type: config.scheme_type.clone(),
            authorization_url: config.authorization_url.clone(),
            flow: config.flow.clone(),
            scopes: config.scopes.clone().filter(|scopes| !scopes.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// Complete Swagger 2.0 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerDocument {
    pub swagger: String,
    pub info: Info,
    pub host: String,
    #[serde(rename = "basePath")]
    pub base_path: String,
    pub schemes: Vec<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    #[serde(rename = "securityDefinitions", default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_definitions: IndexMap<String, SecurityDefinition>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub definitions: IndexMap<String, Schema>,
}

impl DocumentAssembler {
    /// Starts a document from the global configuration.
    pub fn new(config: &ApiConfig) -> Self {
        debug!("Initializing DocumentAssembler for {}", config.title);
        Self {
            info: Info {
                title: config.title.clone(),
                description: config.description.clone(),
                version: config.version.clone(),
            },
            host: config.host(),
            base_path: config.base_path.clone(),
            schemes: config.schemes.clone(),
            security_definitions: config
                .security_definitions
                .iter()
                .map(|(name, security)| (name.clone(), SecurityDefinition::from(security)))
                .collect(),
            tags: Vec::new(),
            paths: IndexMap::new(),
            definitions: IndexMap::new(),
        }
    }

    pub fn add_tag(&mut self, name: &str) {
        if !self.tags.iter().any(|tag| tag.name == name) {
            self.tags.push(Tag {
                name: name.to_string(),
            });
        }
    }

    pub fn add_definition(&mut self, name: &str, schema: Schema) {
        debug!("Adding definition {}", name);
        self.definitions.insert(name.to_string(), schema);
    }

    /// Merges a group of path items into the document.
    pub fn add_paths(&mut self, paths: IndexMap<String, PathItem>) {
        for (template, item) in paths {
            debug!("Adding path {}", template);
            self.paths.entry(template).or_default().merge(item);
        }
    }

    /// Whether `method` on `template` is already documented.
    pub fn has_operation(&self, template: &str, method: HttpMethod) -> bool {
        self.paths
            .get(template)
            .map(|item| item.operation(method).is_some())
            .unwrap_or(false)
    }

    pub fn build(self) -> SwaggerDocument {
        debug!(
            "Building document: {} paths, {} definitions",
            self.paths.len(),
            self.definitions.len()
        );
        SwaggerDocument {
            swagger: SWAGGER_VERSION.to_string(),
            info: self.info,
            host: self.host,
            base_path: self.base_path,
            schemes: self.schemes,
            consumes: vec![JSON_MIME.to_string()],
            produces: vec![JSON_MIME.to_string(), CSV_MIME.to_string()],
            security_definitions: self.security_definitions,
            tags: self.tags,
            paths: self.paths,
            definitions: self.definitions,
        }
    }
}
