//! Serialization of generated Swagger documents to YAML or JSON.
//!
//! Every map in [`SwaggerDocument`] is insertion-ordered, so serializing the same
//! document twice yields byte-identical text.

use crate::document::SwaggerDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a document to YAML.
///
/// # Example
///
/// ```
/// use openapi_from_models::config::ApiConfig;
/// use openapi_from_models::document::DocumentAssembler;
/// use openapi_from_models::serializer::serialize_yaml;
///
/// let doc = DocumentAssembler::new(&ApiConfig::default()).build();
/// let yaml = serialize_yaml(&doc).unwrap();
/// assert!(yaml.contains("swagger:"));
/// assert!(yaml.contains("2.0"));
/// ```
pub fn serialize_yaml(doc: &SwaggerDocument) -> Result<String> {
    debug!("Serializing Swagger document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize Swagger document to YAML")
}

/// Serializes a document to pretty-printed JSON.
pub fn serialize_json(doc: &SwaggerDocument) -> Result<String> {
    debug!("Serializing Swagger document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize Swagger document to JSON")
}

/// Writes `content` to `path`, creating parent directories and overwriting an existing
/// file.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::document::{DocumentAssembler, Operation, PathItem, Response};
    use crate::routes::HttpMethod;
    use crate::schema_builder::Schema;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    fn create_test_document() -> SwaggerDocument {
        let config = ApiConfig {
            title: "Test API".to_string(),
            host: Some("api.example.com".to_string()),
            ..ApiConfig::default()
        };
        let mut assembler = DocumentAssembler::new(&config);
        assembler.add_tag("Articles");

        let mut properties = IndexMap::new();
        properties.insert("title".to_string(), Schema::typed("string"));
        assembler.add_definition("Article", Schema::object(properties, vec!["title".to_string()]));

        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response::new("Success", Some(Schema::array(Schema::reference("Article")))),
        );
        let mut item = PathItem::default();
        item.set_operation(
            HttpMethod::Get,
            Operation {
                tags: vec!["Articles".to_string()],
                operation_id: Some("indexArticles".to_string()),
                responses,
                ..Operation::default()
            },
        );
        let mut paths = IndexMap::new();
        paths.insert("/api/articles".to_string(), item);
        assembler.add_paths(paths);

        assembler.build()
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();
        assert!(yaml.contains("swagger:"));
        assert!(yaml.contains("2.0"));
        assert!(yaml.contains("Test API"));
        assert!(yaml.contains("basePath:"));
        assert!(yaml.contains("/api/articles"));
        assert!(yaml.contains("#/definitions/Article"));

        let parsed: serde_json::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["swagger"], "2.0");
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_document()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["swagger"], "2.0");
        assert_eq!(value["host"], "api.example.com");
        assert_eq!(value["definitions"]["Article"]["required"][0], "title");
        assert_eq!(
            value["paths"]["/api/articles"]["get"]["operationId"],
            "indexArticles"
        );
        assert!(json.lines().count() > 5, "pretty printed JSON spans lines");
    }

    #[test]
    fn test_root_key_order() {
        let json = serialize_json(&create_test_document()).unwrap();
        let keys = [
            "\"swagger\"",
            "\"info\"",
            "\"host\"",
            "\"basePath\"",
            "\"schemes\"",
            "\"consumes\"",
            "\"produces\"",
            "\"tags\"",
            "\"paths\"",
            "\"definitions\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_serialization_is_byte_identical() {
        let doc = create_test_document();
        assert_eq!(serialize_yaml(&doc).unwrap(), serialize_yaml(&doc).unwrap());
        assert_eq!(serialize_json(&doc).unwrap(), serialize_json(&doc).unwrap());
    }

    #[test]
    fn test_roundtrip_json_serialization() {
        let doc = create_test_document();
        let json = serialize_json(&doc).unwrap();
        let parsed: SwaggerDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_write_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("swagger.yaml");

        write_to_file("test content", &file_path).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("public").join("api").join("swagger.json");

        write_to_file("{}", &file_path).unwrap();
        assert!(file_path.exists());
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("swagger.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }
}
