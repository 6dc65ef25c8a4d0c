//! Model metadata: the storage shape, validators and associations of one model.
//!
//! These types are immutable snapshots taken from the ORM layer. They are deserialised
//! from metadata manifests (see [`crate::parser`]) or assembled in code through
//! [`crate::registry::ModelBuilder`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage type of a column as reported by the ORM.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PrimitiveType {
    String,
    Text,
    Integer,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Time,
    Uuid,
    HashMap,
    /// Anything the mapper has no rule for. Rendered as a string with a warning.
    Other(String),
}

impl From<String> for PrimitiveType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "string" => PrimitiveType::String,
            "text" => PrimitiveType::Text,
            "integer" => PrimitiveType::Integer,
            "decimal" => PrimitiveType::Decimal,
            "boolean" => PrimitiveType::Boolean,
            "date" => PrimitiveType::Date,
            "datetime" | "timestamp" => PrimitiveType::DateTime,
            "time" => PrimitiveType::Time,
            "uuid" | "BSON::ObjectId" => PrimitiveType::Uuid,
            "hstore" | "hash_map" => PrimitiveType::HashMap,
            _ => PrimitiveType::Other(value),
        }
    }
}

impl From<PrimitiveType> for String {
    fn from(value: PrimitiveType) -> Self {
        value.as_str().to_string()
    }
}

impl PrimitiveType {
    pub fn as_str(&self) -> &str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Text => "text",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Decimal => "decimal",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Date => "date",
            PrimitiveType::DateTime => "datetime",
            PrimitiveType::Time => "time",
            PrimitiveType::Uuid => "uuid",
            PrimitiveType::HashMap => "hash_map",
            PrimitiveType::Other(name) => name,
        }
    }
}

/// One model attribute's storage shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub primitive_type: PrimitiveType,
    #[serde(default, rename = "array")]
    pub is_array: bool,
    /// Storage default, usually the textual form the database reports.
    #[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, primitive_type: PrimitiveType) -> Self {
        Self {
            name: name.into(),
            primitive_type,
            is_array: false,
            default_value: None,
        }
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default_value = Some(default.into());
        self
    }
}

/// Kind of a declared validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidationKind {
    Presence,
    Inclusion,
    Exclusion,
    Uniqueness,
    Format,
    Numericality,
    Length,
    Absence,
    Custom(String),
}

impl From<String> for ValidationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "presence" => ValidationKind::Presence,
            "inclusion" => ValidationKind::Inclusion,
            "exclusion" => ValidationKind::Exclusion,
            "uniqueness" => ValidationKind::Uniqueness,
            "format" => ValidationKind::Format,
            "numericality" => ValidationKind::Numericality,
            "length" => ValidationKind::Length,
            "absence" => ValidationKind::Absence,
            _ => ValidationKind::Custom(value),
        }
    }
}

impl From<ValidationKind> for String {
    fn from(value: ValidationKind) -> Self {
        match value {
            ValidationKind::Presence => "presence".to_string(),
            ValidationKind::Inclusion => "inclusion".to_string(),
            ValidationKind::Exclusion => "exclusion".to_string(),
            ValidationKind::Uniqueness => "uniqueness".to_string(),
            ValidationKind::Format => "format".to_string(),
            ValidationKind::Numericality => "numericality".to_string(),
            ValidationKind::Length => "length".to_string(),
            ValidationKind::Absence => "absence".to_string(),
            ValidationKind::Custom(name) => name,
        }
    }
}

impl ValidationKind {
    /// Position in the aggregation order. Later kinds may override earlier ones.
    pub fn precedence(&self) -> u8 {
        match self {
            ValidationKind::Presence => 0,
            ValidationKind::Inclusion => 1,
            ValidationKind::Uniqueness => 2,
            ValidationKind::Format => 3,
            ValidationKind::Numericality => 4,
            ValidationKind::Length => 5,
            ValidationKind::Exclusion | ValidationKind::Absence => 6,
            ValidationKind::Custom(_) => 7,
        }
    }
}

/// Option keys whose effect depends on runtime state.
const CONDITIONAL_OPTIONS: [&str; 3] = ["if", "unless", "scope"];

/// A declared validator targeting one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "field")]
    pub field_name: String,
    pub kind: ValidationKind,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, Value>,
}

impl ValidationRule {
    pub fn new(field_name: impl Into<String>, kind: ValidationKind) -> Self {
        Self {
            field_name: field_name.into(),
            kind,
            options: IndexMap::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// True if the rule carries `if`, `unless` or `scope`.
    pub fn is_conditional(&self) -> bool {
        self.options
            .keys()
            .any(|key| CONDITIONAL_OPTIONS.contains(&key.as_str()))
    }

    /// Reads a boolean option, treating absence as `false`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.options.get(key), Some(Value::Bool(true)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

/// Inline create/update of associated records through the parent's write schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedAttributes {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub update_only: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationDescriptor {
    pub name: String,
    #[serde(alias = "model")]
    pub target_model: String,
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_attributes: Option<NestedAttributes>,
}

impl AssociationDescriptor {
    pub fn new(name: impl Into<String>, target_model: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            target_model: target_model.into(),
            cardinality,
            nested_attributes: None,
        }
    }

    /// Whether the association contributes a `{name}_attributes` property to input schemas.
    pub fn accepts_nested_writes(&self) -> bool {
        self.nested_attributes
            .as_ref()
            .map(|nested| nested.enabled && !nested.update_only)
            .unwrap_or(false)
    }
}

/// How a single attribute is exposed through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldVisibility {
    Hidden,
    ReadOnly,
    WriteOnly,
    Normal,
}

/// Everything known about one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    /// False while the backing table has not been created yet.
    #[serde(default = "default_true")]
    pub table_provisioned: bool,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub validations: Vec<ValidationRule>,
    #[serde(default)]
    pub associations: Vec<AssociationDescriptor>,
    #[serde(default)]
    pub hidden: Vec<String>,
    #[serde(default)]
    pub read_only: Vec<String>,
    #[serde(default)]
    pub write_only: Vec<String>,
    /// Model methods clients may request through the `methods` query parameter.
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub searchable: bool,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_provisioned: true,
            columns: Vec::new(),
            validations: Vec::new(),
            associations: Vec::new(),
            hidden: Vec::new(),
            read_only: Vec::new(),
            write_only: Vec::new(),
            methods: Vec::new(),
            searchable: false,
        }
    }

    /// Column names in declaration order.
    pub fn attributes(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_hidden(&self, field: &str) -> bool {
        self.hidden.iter().any(|f| f == field)
    }

    pub fn is_read_only(&self, field: &str) -> bool {
        self.read_only.iter().any(|f| f == field)
    }

    pub fn is_write_only(&self, field: &str) -> bool {
        self.write_only.iter().any(|f| f == field)
    }

    /// Hidden beats read-only, read-only beats write-only.
    pub fn visibility(&self, field: &str) -> FieldVisibility {
        if self.is_hidden(field) {
            FieldVisibility::Hidden
        } else if self.is_read_only(field) {
            FieldVisibility::ReadOnly
        } else if self.is_write_only(field) {
            FieldVisibility::WriteOnly
        } else {
            FieldVisibility::Normal
        }
    }

    /// All attributes minus hidden ones.
    pub fn readable_fields(&self) -> Vec<&str> {
        self.attributes()
            .into_iter()
            .filter(|field| !self.is_hidden(field))
            .collect()
    }

    /// (attributes ∪ write-only) minus hidden and read-only.
    pub fn writable_fields(&self) -> Vec<&str> {
        let mut fields = self.attributes();
        for extra in &self.write_only {
            if !fields.contains(&extra.as_str()) {
                fields.push(extra.as_str());
            }
        }
        fields
            .into_iter()
            .filter(|field| !self.is_hidden(field) && !self.is_read_only(field))
            .collect()
    }

    /// Validators targeting `field`, in declaration order.
    pub fn validators_on<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationRule> + 'a {
        self.validations.iter().filter(move |v| v.field_name == field)
    }
}
