//! Model registry and the metadata-provider seam.
//!
//! Per-model API configuration (hidden, read-only and write-only attributes, whitelisted
//! methods, search capability) lives in explicit [`ModelDefinition`] values stored in a
//! [`ModelRegistry`] keyed by model name. Models are registered either from manifests or
//! through the [`ModelBuilder`] DSL:
//!
//! ```
//! use openapi_from_models::model::PrimitiveType;
//! use openapi_from_models::registry::{ModelBuilder, ModelRegistry};
//!
//! let mut registry = ModelRegistry::new();
//! registry
//!     .register(
//!         ModelBuilder::new("Article")
//!             .column("title", PrimitiveType::String)
//!             .validates_presence_of("title")
//!             .has_many("comments", "Comment")
//!             .read_only(&["id"])
//!             .build(),
//!     )
//!     .unwrap();
//! assert!(registry.contains("Article"));
//! ```

use crate::error::{Error, Result};
use crate::model::{
    AssociationDescriptor, Cardinality, ColumnDescriptor, ModelDefinition, NestedAttributes,
    PrimitiveType, ValidationKind, ValidationRule,
};
use indexmap::IndexMap;
use log::debug;

/// Source of model metadata for the schema builders.
pub trait ModelMetadataProvider {
    /// Looks up a model by its identifier.
    fn model(&self, name: &str) -> Option<&ModelDefinition>;
}

/// Registry of model definitions, in registration order.
#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelDefinition>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model. Registering the same name twice is a configuration error.
    pub fn register(&mut self, model: ModelDefinition) -> Result<()> {
        if self.models.contains_key(&model.name) {
            return Err(Error::DuplicateModel(model.name));
        }
        debug!("Registering model {}", model.name);
        self.models.insert(model.name.clone(), model);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDefinition> {
        self.models.values()
    }
}

impl ModelMetadataProvider for ModelRegistry {
    fn model(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.get(name)
    }
}

/// Fluent builder for a [`ModelDefinition`].
pub struct ModelBuilder {
    model: ModelDefinition,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            model: ModelDefinition::new(name),
        }
    }

    pub fn column(self, name: &str, primitive_type: PrimitiveType) -> Self {
        self.column_def(ColumnDescriptor::new(name, primitive_type))
    }

    pub fn column_def(mut self, column: ColumnDescriptor) -> Self {
        self.model.columns.push(column);
        self
    }

    pub fn validates(mut self, rule: ValidationRule) -> Self {
        self.model.validations.push(rule);
        self
    }

    pub fn validates_presence_of(self, field: &str) -> Self {
        self.validates(ValidationRule::new(field, ValidationKind::Presence))
    }

    pub fn has_many(self, name: &str, target: &str) -> Self {
        self.association(AssociationDescriptor::new(name, target, Cardinality::Many))
    }

    pub fn has_one(self, name: &str, target: &str) -> Self {
        self.association(AssociationDescriptor::new(name, target, Cardinality::One))
    }

    pub fn association(mut self, association: AssociationDescriptor) -> Self {
        self.model.associations.push(association);
        self
    }

    /// Enables nested-attribute writes for an already declared association.
    pub fn accepts_nested_attributes_for(mut self, name: &str, update_only: bool) -> Self {
        if let Some(assoc) = self.model.associations.iter_mut().find(|a| a.name == name) {
            assoc.nested_attributes = Some(NestedAttributes {
                enabled: true,
                update_only,
            });
        }
        self
    }

    pub fn hidden(mut self, fields: &[&str]) -> Self {
        self.model.hidden = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn read_only(mut self, fields: &[&str]) -> Self {
        self.model.read_only = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn write_only(mut self, fields: &[&str]) -> Self {
        self.model.write_only = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn methods(mut self, methods: &[&str]) -> Self {
        self.model.methods = methods.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn searchable(mut self) -> Self {
        self.model.searchable = true;
        self
    }

    /// Marks the backing table as not yet created.
    pub fn unprovisioned(mut self) -> Self {
        self.model.table_provisioned = false;
        self
    }

    pub fn build(self) -> ModelDefinition {
        self.model
    }
}
