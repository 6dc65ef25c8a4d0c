//! Validator aggregation: folds a field's declared validators into schema constraints.
//!
//! Rules are applied in a fixed order (presence, inclusion, uniqueness, format,
//! numericality, length) regardless of declaration order, so a later kind overrides an
//! earlier one deterministically. Rules carrying `if`, `unless` or `scope` are skipped
//! since their effect cannot be known statically.

use crate::model::{ModelDefinition, ValidationKind, ValidationRule};
use crate::schema_builder::Schema;
use log::debug;
use serde_json::{Number, Value};

/// Constraints derived from the validators of a single field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaConstraints {
    pub required: bool,
    pub enum_values: Option<Vec<Value>>,
    pub unique_items: bool,
    pub pattern: Option<String>,
    pub minimum: Option<Number>,
    pub exclusive_minimum: bool,
    pub maximum: Option<Number>,
    pub exclusive_maximum: bool,
    /// Set by `numericality only_integer: true`
    pub force_integer: bool,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

impl SchemaConstraints {
    /// Writes the constraints onto a property schema produced by the type mapper.
    pub fn apply_to(&self, schema: &mut Schema) {
        if let Some(values) = &self.enum_values {
            schema.enum_values = Some(values.clone());
        }
        if self.unique_items {
            schema.unique_items = Some(true);
        }
        if let Some(pattern) = &self.pattern {
            schema.pattern = Some(pattern.clone());
        }
        if let Some(minimum) = &self.minimum {
            schema.minimum = Some(minimum.clone());
        }
        if self.exclusive_minimum {
            schema.exclusive_minimum = Some(true);
        }
        if let Some(maximum) = &self.maximum {
            schema.maximum = Some(maximum.clone());
        }
        if self.exclusive_maximum {
            schema.exclusive_maximum = Some(true);
        }
        if self.force_integer {
            schema.schema_type = Some("integer".to_string());
            schema.format = None;
            if let Some(default) = schema.default.take() {
                schema.default = default.as_f64().map(|f| Value::from(f.trunc() as i64)).or(Some(default));
            }
        }
        if let Some(min_length) = self.min_length {
            schema.min_length = Some(min_length);
        }
        if let Some(max_length) = self.max_length {
            schema.max_length = Some(max_length);
        }
    }
}

/// Aggregates the unconditional validators declared on `field_name`.
pub fn aggregate(model: &ModelDefinition, field_name: &str) -> SchemaConstraints {
    let mut rules: Vec<&ValidationRule> = model
        .validators_on(field_name)
        .filter(|rule| {
            if rule.is_conditional() {
                debug!(
                    "Skipping conditional {:?} validator on {}.{}",
                    rule.kind, model.name, field_name
                );
                false
            } else {
                true
            }
        })
        .collect();
    // stable: same-kind rules keep declaration order
    rules.sort_by_key(|rule| rule.kind.precedence());

    let mut constraints = SchemaConstraints::default();
    for rule in rules {
        apply_rule(&mut constraints, rule);
    }
    constraints
}

fn apply_rule(constraints: &mut SchemaConstraints, rule: &ValidationRule) {
    match &rule.kind {
        ValidationKind::Presence => constraints.required = true,
        ValidationKind::Inclusion => {
            if let Some(Value::Array(values)) = rule.options.get("in") {
                constraints.enum_values = Some(values.clone());
            }
            if inclusion_requires_value(rule) {
                constraints.required = true;
            }
        }
        ValidationKind::Uniqueness => constraints.unique_items = true,
        ValidationKind::Format => {
            if let Some(Value::String(pattern)) = rule.options.get("with") {
                constraints.pattern = Some(pattern.clone());
            }
        }
        ValidationKind::Numericality => {
            for (option, value) in &rule.options {
                match (option.as_str(), value) {
                    ("greater_than_or_equal_to", Value::Number(n)) => {
                        constraints.minimum = Some(n.clone());
                    }
                    ("greater_than", Value::Number(n)) => {
                        constraints.minimum = Some(n.clone());
                        constraints.exclusive_minimum = true;
                    }
                    ("less_than_or_equal_to", Value::Number(n)) => {
                        constraints.maximum = Some(n.clone());
                    }
                    ("less_than", Value::Number(n)) => {
                        constraints.maximum = Some(n.clone());
                        constraints.exclusive_maximum = true;
                    }
                    ("only_integer", Value::Bool(true)) => constraints.force_integer = true,
                    _ => {}
                }
            }
        }
        ValidationKind::Length => {
            for (option, value) in &rule.options {
                let Some(n) = value.as_u64() else { continue };
                match option.as_str() {
                    "minimum" => constraints.min_length = Some(n),
                    "maximum" => constraints.max_length = Some(n),
                    "is" => {
                        constraints.min_length = Some(n);
                        constraints.max_length = Some(n);
                    }
                    _ => {}
                }
            }
        }
        // No Swagger equivalent
        ValidationKind::Exclusion | ValidationKind::Absence => {}
        ValidationKind::Custom(name) => {
            debug!("Ignoring custom validator {} on {}", name, rule.field_name);
        }
    }
}

/// Inclusion makes a field required unless blanks or nils are explicitly allowed.
fn inclusion_requires_value(rule: &ValidationRule) -> bool {
    !(rule.flag("allow_blank") || rule.flag("allow_nil"))
}

/// Fields required by unconditional presence or inclusion validators, in column order
/// followed by any non-column fields in declaration order.
pub fn required_fields(model: &ModelDefinition) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !fields.iter().any(|f| f == name) {
            fields.push(name.to_string());
        }
    };

    for column in &model.columns {
        if aggregate(model, &column.name).required {
            push(&column.name);
        }
    }
    for rule in &model.validations {
        if model.column(&rule.field_name).is_none() && aggregate(model, &rule.field_name).required {
            push(&rule.field_name);
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnDescriptor, PrimitiveType};
    use crate::registry::ModelBuilder;
    use serde_json::json;

    fn rule(field: &str, kind: ValidationKind) -> ValidationRule {
        ValidationRule::new(field, kind)
    }

    #[test]
    fn test_presence_marks_required() {
        let model = ModelBuilder::new("Article").validates_presence_of("title").build();
        assert!(aggregate(&model, "title").required);
        assert!(!aggregate(&model, "body").required);
    }

    #[test]
    fn test_inclusion_sets_enum_and_required() {
        let model = ModelBuilder::new("Article")
            .validates(rule("status", ValidationKind::Inclusion).with_option("in", json!(["draft", "live"])))
            .build();
        let c = aggregate(&model, "status");
        assert_eq!(c.enum_values, Some(vec![json!("draft"), json!("live")]));
        assert!(c.required);
    }

    #[test]
    fn test_inclusion_allowing_nil_is_optional() {
        let model = ModelBuilder::new("Article")
            .validates(
                rule("status", ValidationKind::Inclusion)
                    .with_option("in", json!(["draft"]))
                    .with_option("allow_nil", true),
            )
            .build();
        assert!(!aggregate(&model, "status").required);
    }

    #[test]
    fn test_uniqueness_and_format() {
        let model = ModelBuilder::new("User")
            .validates(rule("email", ValidationKind::Uniqueness))
            .validates(rule("email", ValidationKind::Format).with_option("with", "^[^@]+@[^@]+$"))
            .build();
        let c = aggregate(&model, "email");
        assert!(c.unique_items);
        assert_eq!(c.pattern.as_deref(), Some("^[^@]+@[^@]+$"));
    }

    #[test]
    fn test_numericality_bounds() {
        let model = ModelBuilder::new("Article")
            .validates(
                rule("rating", ValidationKind::Numericality)
                    .with_option("greater_than_or_equal_to", 1)
                    .with_option("less_than_or_equal_to", 5),
            )
            .validates(
                rule("price", ValidationKind::Numericality)
                    .with_option("greater_than", 0)
                    .with_option("less_than", 100),
            )
            .build();

        let rating = aggregate(&model, "rating");
        assert_eq!(rating.minimum, Some(Number::from(1)));
        assert_eq!(rating.maximum, Some(Number::from(5)));
        assert!(!rating.exclusive_minimum);
        assert!(!rating.exclusive_maximum);

        let price = aggregate(&model, "price");
        assert_eq!(price.minimum, Some(Number::from(0)));
        assert!(price.exclusive_minimum);
        assert_eq!(price.maximum, Some(Number::from(100)));
        assert!(price.exclusive_maximum);
    }

    #[test]
    fn test_only_integer_overrides_decimal_column() {
        let model = ModelBuilder::new("Product")
            .column_def(ColumnDescriptor::new("quantity", PrimitiveType::Decimal).with_default("2.0"))
            .validates(rule("quantity", ValidationKind::Numericality).with_option("only_integer", true))
            .build();

        let mut schema = crate::type_mapper::TypeMapper::map(&model.columns[0]).schema;
        assert_eq!(schema.schema_type.as_deref(), Some("number"));

        aggregate(&model, "quantity").apply_to(&mut schema);
        assert_eq!(schema.schema_type.as_deref(), Some("integer"));
        assert!(schema.format.is_none());
        assert_eq!(schema.default, Some(json!(2)));
    }

    #[test]
    fn test_length_is_sets_both_bounds() {
        let model = ModelBuilder::new("Country")
            .validates(rule("code", ValidationKind::Length).with_option("is", 2))
            .validates(
                rule("name", ValidationKind::Length)
                    .with_option("minimum", 3)
                    .with_option("maximum", 60),
            )
            .build();

        let code = aggregate(&model, "code");
        assert_eq!((code.min_length, code.max_length), (Some(2), Some(2)));

        let name = aggregate(&model, "name");
        assert_eq!((name.min_length, name.max_length), (Some(3), Some(60)));
    }

    #[test]
    fn test_conditional_rules_are_ignored() {
        let model = ModelBuilder::new("Article")
            .validates(rule("title", ValidationKind::Presence).with_option("if", "published?"))
            .validates(rule("slug", ValidationKind::Uniqueness).with_option("scope", "blog_id"))
            .build();
        assert_eq!(aggregate(&model, "title"), SchemaConstraints::default());
        assert_eq!(aggregate(&model, "slug"), SchemaConstraints::default());
    }

    #[test]
    fn test_exclusion_absence_and_custom_have_no_effect() {
        let model = ModelBuilder::new("Article")
            .validates(rule("title", ValidationKind::Exclusion).with_option("in", json!(["admin"])))
            .validates(rule("title", ValidationKind::Absence))
            .validates(rule("title", ValidationKind::Custom("ProfanityValidator".to_string())))
            .build();
        assert_eq!(aggregate(&model, "title"), SchemaConstraints::default());
    }

    #[test]
    fn test_later_kind_wins_regardless_of_declaration_order() {
        // length declared before presence still leaves presence applied
        let model = ModelBuilder::new("Article")
            .validates(rule("title", ValidationKind::Length).with_option("maximum", 10))
            .validates(rule("title", ValidationKind::Presence))
            .build();
        let c = aggregate(&model, "title");
        assert!(c.required);
        assert_eq!(c.max_length, Some(10));
    }

    #[test]
    fn test_required_fields_follow_column_order() {
        let model = ModelBuilder::new("Article")
            .column("title", PrimitiveType::String)
            .column("status", PrimitiveType::String)
            .column("body", PrimitiveType::Text)
            .validates(rule("status", ValidationKind::Inclusion).with_option("in", json!(["a"])))
            .validates_presence_of("title")
            .validates_presence_of("password")
            .build();
        assert_eq!(required_fields(&model), vec!["title", "status", "password"]);
    }
}
