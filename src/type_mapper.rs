use crate::model::{ColumnDescriptor, PrimitiveType};
use crate::schema_builder::Schema;
use log::debug;
use serde_json::{Number, Value};

/// Field type mapper - converts a column's storage shape into a schema type, format and default.
///
/// The mapper only looks at a single column. Validator-derived constraints are layered on top
/// by [`crate::validators`], which runs afterwards so that a numericality `only_integer`
/// validator can still override the type chosen here.
pub struct TypeMapper;

/// Result of mapping a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedType {
    /// Partial property schema: type, format, default and items
    pub schema: Schema,
    /// Set when the column type had no mapping rule
    pub warning: Option<String>,
}

impl TypeMapper {
    /// Maps one column to its property schema.
    pub fn map(column: &ColumnDescriptor) -> MappedType {
        debug!(
            "Mapping column {} ({}{})",
            column.name,
            column.primitive_type.as_str(),
            if column.is_array { "[]" } else { "" }
        );

        let default = column.default_value.as_ref();
        let mut warning = None;

        let schema = match &column.primitive_type {
            PrimitiveType::String if column.is_array => {
                let mut schema = Schema::array(Schema::typed("string"));
                schema.default = default.map(bracket_substitute);
                schema
            }
            PrimitiveType::String | PrimitiveType::Text => {
                let mut schema = Schema::typed("string");
                schema.default = default.cloned();
                schema
            }
            PrimitiveType::Integer if column.is_array => {
                let mut schema = Schema::array(Schema::typed("integer"));
                schema.default = default.map(integer_array_default);
                schema
            }
            PrimitiveType::Integer => {
                let mut schema = Schema::typed("integer");
                schema.default = default.and_then(coerce_integer).map(Value::from);
                schema
            }
            PrimitiveType::Decimal => {
                let mut schema = Schema::typed("number");
                schema.format = Some("double".to_string());
                schema.default = default
                    .and_then(coerce_float)
                    .and_then(Number::from_f64)
                    .map(Value::Number);
                schema
            }
            PrimitiveType::HashMap => {
                let mut schema = Schema::typed("object");
                schema.items = Some(Box::new(Schema::typed("string")));
                schema.default = default.cloned();
                schema
            }
            PrimitiveType::Boolean => {
                let mut schema = Schema::typed("boolean");
                schema.default = default.map(|value| Value::Bool(to_bool(value)));
                schema
            }
            PrimitiveType::Date => Schema::formatted("string", "date", default.map(stringify)),
            PrimitiveType::DateTime => {
                Schema::formatted("string", "date-time", default.map(stringify))
            }
            PrimitiveType::Time => Schema::formatted("string", "time", default.map(stringify)),
            PrimitiveType::Uuid => Schema::formatted("string", "uuid", default.cloned()),
            PrimitiveType::Other(type_name) => {
                let message = format!(
                    "The type `{}` of attribute `{}` could not be determined. It will be treated as String.",
                    type_name, column.name
                );
                debug!("{}", message);
                warning = Some(message);
                Schema::typed("string")
            }
        };

        MappedType { schema, warning }
    }
}

/// Three-state truthiness for boolean column defaults.
///
/// Booleans pass through, `"true"` (any case) and `"1"` are true, numbers are true iff
/// positive and null is false. Any other value is treated as true; that catch-all is kept
/// as-is until there is a decided contract for exotic defaults.
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true") || s == "1",
        Value::Number(n) => n.as_f64().map(|f| f > 0.0).unwrap_or(false),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Rewrites a storage array literal `{a,b}` into `[a,b]`. Non-string values pass through.
fn bracket_substitute(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.replace('{', "[").replace('}', "]")),
        other => other.clone(),
    }
}

fn integer_array_default(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let literal = s.replace('{', "[").replace('}', "]");
            let inner = literal.trim().trim_start_matches('[').trim_end_matches(']');
            if inner.trim().is_empty() {
                return Value::Array(Vec::new());
            }
            Value::Array(
                inner
                    .split(',')
                    .map(|element| Value::from(leading_integer(element)))
                    .collect(),
            )
        }
        Value::Array(elements) => Value::Array(
            elements
                .iter()
                .map(|e| coerce_integer(e).map(Value::from).unwrap_or_else(|| e.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn stringify(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}

/// Integer coercion for storage defaults: numbers truncate, strings take their leading
/// integer (`"12px"` -> 12, `"abc"` -> 0).
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => Some(leading_integer(s)),
        _ => None,
    }
}

/// Float coercion for storage defaults: strings take their leading number, else 0.0.
pub fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(leading_float(s)),
        _ => None,
    }
}

fn leading_integer(text: &str) -> i64 {
    let text = text.trim();
    let mut end = 0;
    for (i, c) in text.char_indices() {
        if c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')) {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    text[..end].parse().unwrap_or(0)
}

fn leading_float(text: &str) -> f64 {
    let text = text.trim();
    let candidate: String = text
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        .collect();
    // Shrink until the prefix parses, e.g. "1.5e" -> "1.5"
    (1..=candidate.len())
        .rev()
        .find_map(|len| candidate[..len].parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(column: ColumnDescriptor) -> Schema {
        TypeMapper::map(&column).schema
    }

    #[test]
    fn test_string_passes_default_through() {
        let schema = map(ColumnDescriptor::new("title", PrimitiveType::String).with_default("draft"));
        assert_eq!(schema.schema_type.as_deref(), Some("string"));
        assert_eq!(schema.default, Some(json!("draft")));
    }

    #[test]
    fn test_string_array_default_is_bracket_substituted() {
        let schema = map(
            ColumnDescriptor::new("tags", PrimitiveType::String)
                .array()
                .with_default("{news,tech}"),
        );
        assert_eq!(schema.schema_type.as_deref(), Some("array"));
        assert_eq!(schema.items.unwrap().schema_type.as_deref(), Some("string"));
        assert_eq!(schema.default, Some(json!("[news,tech]")));
    }

    #[test]
    fn test_text_maps_to_string() {
        let schema = map(ColumnDescriptor::new("body", PrimitiveType::Text));
        assert_eq!(schema.schema_type.as_deref(), Some("string"));
        assert!(schema.default.is_none());
    }

    #[test]
    fn test_integer_default_coerced() {
        let schema = map(ColumnDescriptor::new("rating", PrimitiveType::Integer).with_default("3"));
        assert_eq!(schema.schema_type.as_deref(), Some("integer"));
        assert_eq!(schema.default, Some(json!(3)));
    }

    #[test]
    fn test_integer_array_default_elements_coerced() {
        let schema = map(
            ColumnDescriptor::new("scores", PrimitiveType::Integer)
                .array()
                .with_default("{1,2,3}"),
        );
        assert_eq!(schema.items.unwrap().schema_type.as_deref(), Some("integer"));
        assert_eq!(schema.default, Some(json!([1, 2, 3])));

        let empty = map(
            ColumnDescriptor::new("scores", PrimitiveType::Integer)
                .array()
                .with_default("{}"),
        );
        assert_eq!(empty.default, Some(json!([])));
    }

    #[test]
    fn test_decimal_maps_to_double() {
        let schema = map(ColumnDescriptor::new("price", PrimitiveType::Decimal).with_default("9.99"));
        assert_eq!(schema.schema_type.as_deref(), Some("number"));
        assert_eq!(schema.format.as_deref(), Some("double"));
        assert_eq!(schema.default, Some(json!(9.99)));
    }

    #[test]
    fn test_hash_map_is_object_of_strings() {
        let schema = map(ColumnDescriptor::new("settings", PrimitiveType::HashMap));
        assert_eq!(schema.schema_type.as_deref(), Some("object"));
        assert_eq!(schema.items.unwrap().schema_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_boolean_defaults_follow_truthiness() {
        let falsy = map(ColumnDescriptor::new("published", PrimitiveType::Boolean).with_default(0));
        assert_eq!(falsy.default, Some(json!(false)));

        let truthy = map(ColumnDescriptor::new("published", PrimitiveType::Boolean).with_default(5));
        assert_eq!(truthy.default, Some(json!(true)));

        let text = map(ColumnDescriptor::new("published", PrimitiveType::Boolean).with_default("TRUE"));
        assert_eq!(text.default, Some(json!(true)));

        let none = map(ColumnDescriptor::new("published", PrimitiveType::Boolean));
        assert!(none.default.is_none());
    }

    #[test]
    fn test_to_bool_catch_all() {
        assert!(to_bool(&json!(true)));
        assert!(!to_bool(&json!(false)));
        assert!(to_bool(&json!("1")));
        assert!(!to_bool(&json!("yes")));
        assert!(!to_bool(&json!(-2)));
        assert!(!to_bool(&Value::Null));
        assert!(to_bool(&json!({"a": 1})));
        assert!(to_bool(&json!([])));
    }

    #[test]
    fn test_temporal_formats() {
        let date = map(ColumnDescriptor::new("day", PrimitiveType::Date).with_default("2024-01-01"));
        assert_eq!(date.schema_type.as_deref(), Some("string"));
        assert_eq!(date.format.as_deref(), Some("date"));
        assert_eq!(date.default, Some(json!("2024-01-01")));

        let datetime = map(ColumnDescriptor::new("created_at", PrimitiveType::DateTime));
        assert_eq!(datetime.format.as_deref(), Some("date-time"));

        let time = map(ColumnDescriptor::new("opens_at", PrimitiveType::Time).with_default(900));
        assert_eq!(time.format.as_deref(), Some("time"));
        assert_eq!(time.default, Some(json!("900")));
    }

    #[test]
    fn test_uuid_format() {
        let schema = map(ColumnDescriptor::new("id", PrimitiveType::Uuid));
        assert_eq!(schema.schema_type.as_deref(), Some("string"));
        assert_eq!(schema.format.as_deref(), Some("uuid"));
    }

    #[test]
    fn test_unknown_type_falls_back_with_warning() {
        let mapped = TypeMapper::map(&ColumnDescriptor::new(
            "location",
            PrimitiveType::Other("geometry".to_string()),
        ));
        assert_eq!(mapped.schema.schema_type.as_deref(), Some("string"));
        let warning = mapped.warning.unwrap();
        assert!(warning.contains("geometry"));
        assert!(warning.contains("location"));
    }

    #[test]
    fn test_defaults_round_trip_to_storage_values() {
        // integer: "42" -> 42 -> "42"
        let int = map(ColumnDescriptor::new("n", PrimitiveType::Integer).with_default("42"));
        assert_eq!(int.default.unwrap().as_i64().unwrap().to_string(), "42");

        // decimal: "2.5" -> 2.5 -> 2.5
        let dec = map(ColumnDescriptor::new("d", PrimitiveType::Decimal).with_default("2.5"));
        assert_eq!(dec.default.unwrap().as_f64().unwrap(), "2.5".parse::<f64>().unwrap());

        // integer array: "{4,5}" -> [4,5] -> "{4,5}"
        let arr = map(
            ColumnDescriptor::new("a", PrimitiveType::Integer)
                .array()
                .with_default("{4,5}"),
        );
        let rendered: Vec<String> = arr
            .default
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(format!("{{{}}}", rendered.join(",")), "{4,5}");
    }

    #[test]
    fn test_leading_number_parsing() {
        assert_eq!(leading_integer("12px"), 12);
        assert_eq!(leading_integer("-7"), -7);
        assert_eq!(leading_integer("abc"), 0);
        assert_eq!(leading_float("1.5e"), 1.5);
        assert_eq!(leading_float("x"), 0.0);
    }
}
