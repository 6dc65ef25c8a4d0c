//! Generation configuration: global API metadata and per-resource declarations.
//!
//! Both are plain serde types so they can live in YAML or JSON manifests next to the
//! model metadata. Every field has a default except the ones that identify a resource.

use crate::document::PathItem;
use crate::schema_builder::{property_name, DEFAULT_MAX_ASSOCIATION_DEPTH};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Environment variable consulted when no host is configured.
pub const HOST_ENV_VAR: &str = "HOST";
pub const DEFAULT_HOST: &str = "localhost:3000";
pub const DEFAULT_PER_PAGE_MAX: u32 = 50;

/// Global API metadata and generation switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub title: String,
    pub description: String,
    pub version: String,
    /// Falls back to `$HOST`, then `localhost:3000`
    pub host: Option<String>,
    pub base_path: String,
    pub schemes: Vec<String>,
    pub security_definitions: IndexMap<String, SecurityDefinitionConfig>,
    /// Controllers to document, in tag order. Empty means every configured resource.
    pub controllers: Vec<String>,
    /// Enables undocumented-route diagnostics
    pub development: bool,
    pub per_page_default: Option<u32>,
    pub per_page_max: u32,
    pub max_association_depth: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            title: "Default".to_string(),
            description: String::new(),
            version: "1.0".to_string(),
            host: None,
            base_path: "/api".to_string(),
            schemes: vec!["https".to_string()],
            security_definitions: IndexMap::new(),
            controllers: Vec::new(),
            development: false,
            per_page_default: None,
            per_page_max: DEFAULT_PER_PAGE_MAX,
            max_association_depth: DEFAULT_MAX_ASSOCIATION_DEPTH,
        }
    }
}

impl ApiConfig {
    /// Configured host, else `$HOST`, else `localhost:3000`.
    pub fn host(&self) -> String {
        self.host
            .clone()
            .or_else(|| std::env::var(HOST_ENV_VAR).ok().filter(|h| !h.is_empty()))
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }
}

/// One security scheme as declared in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityDefinitionConfig {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<IndexMap<String, String>>,
}

/// A named query restriction exposed on the index action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFilter {
    /// `default`, `string`, `integer`, `boolean`, ...
    #[serde(rename = "type", default = "default_scope_type")]
    pub scope_type: String,
    /// Query parameter name, when different from the scope name
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
}

fn default_scope_type() -> String {
    "default".to_string()
}

impl ScopeFilter {
    /// `default` scopes are plain strings.
    pub fn parameter_type(&self) -> &str {
        if self.scope_type == "default" {
            "string"
        } else {
            &self.scope_type
        }
    }
}

/// Per-controller resource declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub controller: String,
    /// Model backing the controller; must be registered
    pub model: String,
    /// Plural display name, also used as tag, e.g. `Articles`
    pub collection_name: String,
    /// Singular name used for definitions; defaults to the model name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    /// Overrides the API-wide base path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
    #[serde(default, alias = "excluded_actions")]
    pub except_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page_max: Option<u32>,
    #[serde(default)]
    pub scopes: IndexMap<String, ScopeFilter>,
    /// Hand-written operations for custom actions, keyed by path template
    #[serde(default)]
    pub custom_operations: IndexMap<String, PathItem>,
}

impl ResourceConfig {
    pub fn new(controller: &str, model: &str, collection_name: &str) -> Self {
        Self {
            controller: controller.to_string(),
            model: model.to_string(),
            collection_name: collection_name.to_string(),
            resource_name: None,
            base_path: None,
            relative_path: None,
            except_actions: Vec::new(),
            per_page: None,
            per_page_max: None,
            scopes: IndexMap::new(),
            custom_operations: IndexMap::new(),
        }
    }

    pub fn resource_name(&self) -> &str {
        self.resource_name.as_deref().unwrap_or(&self.model)
    }

    /// Path below the base path, `/` + snake_case collection name unless configured.
    pub fn relative_path(&self) -> String {
        match &self.relative_path {
            Some(path) if path.starts_with('/') => path.clone(),
            Some(path) => format!("/{}", path),
            None => format!("/{}", property_name(&self.collection_name)),
        }
    }

    pub fn effective_base_path<'a>(&'a self, api_base_path: &'a str) -> &'a str {
        self.base_path.as_deref().unwrap_or(api_base_path)
    }

    /// `{base}/{relative}`
    pub fn collection_path(&self, api_base_path: &str) -> String {
        join_paths(self.effective_base_path(api_base_path), &self.relative_path())
    }

    /// `{base}/{relative}/{id}`
    pub fn item_path(&self, api_base_path: &str) -> String {
        format!("{}/{{id}}", self.collection_path(api_base_path))
    }

    pub fn excludes(&self, action: &str) -> bool {
        self.except_actions.iter().any(|a| a == action)
    }
}

fn join_paths(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    format!("{}/{}", base, relative)
}
