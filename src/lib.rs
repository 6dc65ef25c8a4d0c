//! openapi-from-models - Swagger 2.0 documents derived from model metadata.
//!
//! Reflects facts that already exist in a data layer (column types, validators,
//! associations, attribute visibility) and a router's registered routes into a Swagger
//! 2.0 document, so CRUD APIs do not need hand-written API documentation.
//!
//! # Architecture
//!
//! 1. [`model`] and [`registry`] - Model metadata and the [`registry::ModelMetadataProvider`] seam
//! 2. [`type_mapper`] - Maps one column's storage type and default to a property schema
//! 3. [`validators`] - Folds a field's validators into schema constraints
//! 4. [`schema_builder`] - Composes the two into read and input definitions per model
//! 5. [`routes`] - Route tables and their normalization into `(method, path, action)` entries
//! 6. [`crud_builder`] - Emits the index/create/show/update/destroy operations of a resource
//! 7. [`document`] - Swagger document types and the root assembler
//! 8. [`generator`] - Runs one generation pass and collects diagnostics
//! 9. [`scanner`], [`parser`] - Load YAML/JSON metadata manifests
//! 10. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_models::config::{ApiConfig, ResourceConfig};
//! use openapi_from_models::generator::Generator;
//! use openapi_from_models::model::PrimitiveType;
//! use openapi_from_models::registry::{ModelBuilder, ModelRegistry};
//! use openapi_from_models::routes::{RawRoute, RouteTable};
//! use openapi_from_models::serializer::serialize_yaml;
//!
//! let mut models = ModelRegistry::new();
//! models
//!     .register(
//!         ModelBuilder::new("Article")
//!             .column("title", PrimitiveType::String)
//!             .validates_presence_of("title")
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let mut routes = RouteTable::new();
//! routes.add(RawRoute::new("articles", "GET", "/api/articles(.:format)", "articles#index"));
//!
//! let config = ApiConfig::default();
//! let resources = vec![ResourceConfig::new("articles", "Article", "Articles")];
//! let output = Generator::new(&config, &resources, &models, &routes)
//!     .unwrap()
//!     .generate();
//!
//! assert!(output.document.paths.contains_key("/api/articles"));
//! println!("{}", serialize_yaml(&output.document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod config;
pub mod crud_builder;
pub mod document;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod registry;
pub mod routes;
pub mod scanner;
pub mod schema_builder;
pub mod serializer;
pub mod type_mapper;
pub mod validators;
