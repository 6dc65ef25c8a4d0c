use crate::config::ResourceConfig;
use crate::document::{
    DocumentAssembler, Header, Operation, Parameter, ParameterLocation, PathItem, Response, JSON_MIME,
};
use crate::generator::{Diagnostic, DiagnosticKind};
use crate::routes::{HttpMethod, RouteEntry};
use crate::schema_builder::{property_name, Schema};
use indexmap::IndexMap;
use log::debug;
use serde_json::{json, Number};

/// The five conventional resource actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudAction {
    Index,
    Create,
    Show,
    Update,
    Destroy,
}

impl CrudAction {
    pub const ALL: [CrudAction; 5] = [
        CrudAction::Index,
        CrudAction::Create,
        CrudAction::Show,
        CrudAction::Update,
        CrudAction::Destroy,
    ];

    pub fn parse(action: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|crud| crud.as_str() == action)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CrudAction::Index => "index",
            CrudAction::Create => "create",
            CrudAction::Show => "show",
            CrudAction::Update => "update",
            CrudAction::Destroy => "destroy",
        }
    }

    /// Method the action is documented under.
    pub fn method(&self) -> HttpMethod {
        match self {
            CrudAction::Index | CrudAction::Show => HttpMethod::Get,
            CrudAction::Create => HttpMethod::Post,
            CrudAction::Update => HttpMethod::Put,
            CrudAction::Destroy => HttpMethod::Delete,
        }
    }

    /// `index` and `create` live on the collection path, the rest on the item path.
    pub fn is_collection(&self) -> bool {
        matches!(self, CrudAction::Index | CrudAction::Create)
    }

    fn summary(&self) -> &'static str {
        match self {
            CrudAction::Index => "Index",
            CrudAction::Create => "Create",
            CrudAction::Show => "Show",
            CrudAction::Update => "Update",
            CrudAction::Destroy => "Destroy",
        }
    }
}

/// Definition names the operations refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNames {
    pub resource: String,
    pub input: String,
}

impl SchemaNames {
    pub fn for_resource(resource_name: &str) -> Self {
        Self {
            resource: resource_name.to_string(),
            input: format!("{}Input", resource_name),
        }
    }
}

/// CRUD operation builder - emits the documented operations of one resource.
pub struct CrudOperationBuilder<'a> {
    resource: &'a ResourceConfig,
    collection_path: String,
    item_path: String,
    searchable: bool,
    methods: Vec<String>,
    per_page_default: Option<u32>,
    per_page_max: u32,
}

impl<'a> CrudOperationBuilder<'a> {
    pub fn new(resource: &'a ResourceConfig, api_base_path: &str) -> Self {
        Self {
            resource,
            collection_path: resource.collection_path(api_base_path),
            item_path: resource.item_path(api_base_path),
            searchable: false,
            methods: Vec::new(),
            per_page_default: resource.per_page,
            per_page_max: resource.per_page_max.unwrap_or(crate::config::DEFAULT_PER_PAGE_MAX),
        }
    }

    /// Adds the `search` parameter to `index`.
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    /// Model methods clients may request through the `methods` parameter.
    pub fn methods(mut self, methods: &[String]) -> Self {
        self.methods = methods.to_vec();
        self
    }

    /// API-wide pagination settings; the resource's own values take precedence.
    pub fn pagination(mut self, default: Option<u32>, max: u32) -> Self {
        self.per_page_default = self.resource.per_page.or(default);
        self.per_page_max = self.resource.per_page_max.unwrap_or(max);
        self
    }

    pub fn collection_path(&self) -> &str {
        &self.collection_path
    }

    pub fn item_path(&self) -> &str {
        &self.item_path
    }

    /// Whether `action` has a registered route and is not excluded.
    pub fn includes(&self, action: CrudAction, routes: &[RouteEntry]) -> bool {
        routes.iter().any(|route| route.action == action.as_str())
            && !self.resource.excludes(action.as_str())
    }

    /// Builds the collection and item path items. Paths without any included action are
    /// left out.
    pub fn build(&self, routes: &[RouteEntry], names: &SchemaNames) -> IndexMap<String, PathItem> {
        let mut collection = PathItem::default();
        let mut item = PathItem::default();

        for action in CrudAction::ALL {
            if !self.includes(action, routes) {
                debug!(
                    "{}: {} not documented (no route or excluded)",
                    self.resource.controller,
                    action.as_str()
                );
                continue;
            }
            let operation = self.operation(action, names);
            if action.is_collection() {
                collection.set_operation(action.method(), operation);
            } else {
                item.set_operation(action.method(), operation);
            }
        }

        let mut paths = IndexMap::new();
        if !collection.operations().is_empty() {
            paths.insert(self.collection_path.clone(), collection);
        }
        if !item.operations().is_empty() {
            paths.insert(self.item_path.clone(), item);
        }
        paths
    }

    fn operation(&self, action: CrudAction, names: &SchemaNames) -> Operation {
        let collection = identifier(&self.resource.collection_name);
        let resource = identifier(&names.resource);
        let operation_id = match action {
            CrudAction::Index => format!("index{}", collection),
            CrudAction::Create => format!("create{}", collection),
            CrudAction::Show => format!("show{}ById", resource),
            CrudAction::Update => format!("update{}", resource),
            CrudAction::Destroy => format!("destroy{}", resource),
        };

        let mut parameters = Vec::new();
        let mut responses = IndexMap::new();
        let body = Parameter::body(&property_name(&names.resource), Schema::reference(&names.input));

        match action {
            CrudAction::Index => {
                parameters.extend(self.pagination_parameters());
                parameters.extend(self.projection_parameters());
                if self.searchable {
                    parameters.push(
                        Parameter::simple("search", ParameterLocation::Query, "string", false)
                            .described("Search query string"),
                    );
                }
                parameters.extend(self.scope_parameters());

                let mut success = Response::new("Success", Some(Schema::array(Schema::reference(&names.resource))));
                success.headers.insert(
                    "X-Total-Count".to_string(),
                    Header {
                        header_type: "integer".to_string(),
                        description: Some("Total number of records".to_string()),
                    },
                );
                success.headers.insert(
                    "Link".to_string(),
                    Header {
                        header_type: "string".to_string(),
                        description: Some("URL of the next page, rel=\"next\"".to_string()),
                    },
                );
                responses.insert("200".to_string(), success);
            }
            CrudAction::Create => {
                parameters.push(body);
                parameters.extend(self.projection_parameters());
                responses.insert(
                    "201".to_string(),
                    Response::new("Success", Some(Schema::reference(&names.resource))),
                );
                responses.insert("422".to_string(), Response::new("Validation failed", None));
            }
            CrudAction::Show => {
                parameters.push(id_parameter());
                parameters.extend(self.projection_parameters());
                responses.insert(
                    "200".to_string(),
                    Response::new("Success", Some(Schema::reference(&names.resource))),
                );
                responses.insert("404".to_string(), Response::new("Not found", None));
            }
            CrudAction::Update => {
                parameters.push(id_parameter());
                parameters.extend(self.projection_parameters());
                parameters.push(body);
                responses.insert(
                    "200".to_string(),
                    Response::new("Success", Some(Schema::reference(&names.resource))),
                );
                responses.insert("404".to_string(), Response::new("Not found", None));
                responses.insert("422".to_string(), Response::new("Validation failed", None));
            }
            CrudAction::Destroy => {
                parameters.push(id_parameter());
                responses.insert("204".to_string(), Response::new("Success", None));
                responses.insert("404".to_string(), Response::new("Not found", None));
            }
        }

        Operation {
            tags: vec![self.resource.collection_name.clone()],
            summary: Some(action.summary().to_string()),
            description: None,
            operation_id: Some(operation_id),
            // destroy answers with an empty body
            produces: (action != CrudAction::Destroy).then(|| vec![JSON_MIME.to_string()]),
            parameters,
            responses,
        }
    }

    fn pagination_parameters(&self) -> Vec<Parameter> {
        let mut page = Parameter::simple("page", ParameterLocation::Query, "integer", false)
            .described("Page number")
            .formatted("int32");
        page.default = Some(json!(1));
        page.minimum = Some(Number::from(1));

        let mut per_page = Parameter::simple("perPage", ParameterLocation::Query, "integer", false)
            .described("Items per page")
            .formatted("int32");
        per_page.default = self
            .per_page_default
            .map(|default| json!(default.min(self.per_page_max)));
        per_page.minimum = Some(Number::from(1));
        per_page.maximum = Some(Number::from(self.per_page_max));

        vec![page, per_page]
    }

    fn projection_parameters(&self) -> Vec<Parameter> {
        let mut fields = Parameter::simple("fields", ParameterLocation::Query, "array", false)
            .described("Return exact model fields");
        fields.items = Some(Schema::typed("string"));

        let mut methods = Parameter::simple("methods", ParameterLocation::Query, "array", false)
            .described("Include model methods");
        let mut items = Schema::typed("string");
        if !self.methods.is_empty() {
            items.enum_values = Some(self.methods.iter().map(|m| json!(m)).collect());
        }
        methods.items = Some(items);

        vec![fields, methods]
    }

    fn scope_parameters(&self) -> Vec<Parameter> {
        self.resource
            .scopes
            .iter()
            .map(|(name, scope)| {
                let param_name = scope.param_name.as_deref().unwrap_or(name);
                let param_type = scope.parameter_type();
                let parameter = Parameter::simple(param_name, ParameterLocation::Query, param_type, false);
                if param_type == "integer" {
                    parameter.formatted("int32")
                } else {
                    parameter
                }
            })
            .collect()
    }
}

fn id_parameter() -> Parameter {
    Parameter::simple("id", ParameterLocation::Path, "string", true)
}

/// Operation id fragment: the name with separators removed.
fn identifier(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Reports custom (non-CRUD) routes of `controller` that have no documented operation
/// in the document under construction.
pub fn undocumented_routes(
    controller: &str,
    routes: &[RouteEntry],
    assembler: &DocumentAssembler,
) -> Vec<Diagnostic> {
    routes
        .iter()
        .filter(|route| CrudAction::parse(&route.action).is_none())
        .filter(|route| !assembler.has_operation(&route.template(), route.method))
        .map(|route| {
            Diagnostic::new(
                DiagnosticKind::UndocumentedRoute,
                format!(
                    "{} misses specification for: {} {}",
                    controller,
                    route.method.as_str(),
                    route.path
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, ScopeFilter};
    use pretty_assertions::assert_eq;

    fn crud_routes() -> Vec<RouteEntry> {
        vec![
            RouteEntry::new(HttpMethod::Get, "/api/articles", "index"),
            RouteEntry::new(HttpMethod::Post, "/api/articles", "create"),
            RouteEntry::new(HttpMethod::Get, "/api/articles/:id", "show"),
            RouteEntry::new(HttpMethod::Patch, "/api/articles/:id", "update"),
            RouteEntry::new(HttpMethod::Put, "/api/articles/:id", "update"),
            RouteEntry::new(HttpMethod::Delete, "/api/articles/:id", "destroy"),
        ]
    }

    fn articles() -> ResourceConfig {
        ResourceConfig::new("articles", "Article", "Articles")
    }

    fn names() -> SchemaNames {
        SchemaNames::for_resource("Article")
    }

    fn param<'o>(operation: &'o Operation, name: &str) -> Option<&'o Parameter> {
        operation.parameters.iter().find(|p| p.name == name)
    }

    #[test]
    fn test_all_actions_grouped_by_path() {
        let resource = articles();
        let paths = CrudOperationBuilder::new(&resource, "/api").build(&crud_routes(), &names());

        let keys: Vec<_> = paths.keys().cloned().collect();
        assert_eq!(keys, vec!["/api/articles", "/api/articles/{id}"]);

        let collection = &paths["/api/articles"];
        assert!(collection.get.is_some());
        assert!(collection.post.is_some());
        let item = &paths["/api/articles/{id}"];
        assert!(item.get.is_some());
        assert!(item.put.is_some());
        assert!(item.delete.is_some());
        assert!(item.patch.is_none());
    }

    #[test]
    fn test_operation_ids_and_tags() {
        let resource = articles();
        let paths = CrudOperationBuilder::new(&resource, "/api").build(&crud_routes(), &names());
        let ids: Vec<_> = paths
            .values()
            .flat_map(|item| item.operations())
            .map(|(_, op)| op.operation_id.clone().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec![
                "indexArticles",
                "createArticles",
                "showArticleById",
                "updateArticle",
                "destroyArticle"
            ]
        );
        let index = paths["/api/articles"].get.as_ref().unwrap();
        assert_eq!(index.tags, vec!["Articles"]);
        assert_eq!(index.summary.as_deref(), Some("Index"));
        assert_eq!(index.produces, Some(vec!["application/json".to_string()]));
        assert!(paths["/api/articles/{id}"].delete.as_ref().unwrap().produces.is_none());
    }

    #[test]
    fn test_excluded_action_is_omitted() {
        let mut resource = articles();
        resource.except_actions = vec!["destroy".to_string()];
        let paths = CrudOperationBuilder::new(&resource, "/api").build(&crud_routes(), &names());
        let item = &paths["/api/articles/{id}"];
        assert!(item.delete.is_none());
        assert!(item.get.is_some());
        assert!(item.put.is_some());
    }

    #[test]
    fn test_unrouted_actions_are_omitted() {
        let resource = articles();
        let routes = vec![RouteEntry::new(HttpMethod::Get, "/api/articles", "index")];
        let paths = CrudOperationBuilder::new(&resource, "/api").build(&routes, &names());
        assert_eq!(paths.len(), 1);
        assert!(paths["/api/articles"].post.is_none());
    }

    #[test]
    fn test_index_parameters() {
        let mut resource = articles();
        resource.per_page = Some(20);
        resource.scopes.insert(
            "by_author".to_string(),
            ScopeFilter {
                scope_type: "integer".to_string(),
                param_name: Some("author_id".to_string()),
            },
        );
        resource.scopes.insert(
            "published".to_string(),
            ScopeFilter {
                scope_type: "default".to_string(),
                param_name: None,
            },
        );
        let api = ApiConfig::default();
        let paths = CrudOperationBuilder::new(&resource, "/api")
            .searchable(true)
            .pagination(api.per_page_default, api.per_page_max)
            .build(&crud_routes(), &names());
        let index = paths["/api/articles"].get.as_ref().unwrap();

        let names: Vec<_> = index.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["page", "perPage", "fields", "methods", "search", "author_id", "published"]
        );

        let per_page = param(index, "perPage").unwrap();
        assert_eq!(per_page.format.as_deref(), Some("int32"));
        assert_eq!(per_page.default, Some(json!(20)));
        assert_eq!(per_page.maximum, Some(Number::from(50)));

        let author = param(index, "author_id").unwrap();
        assert_eq!(author.param_type.as_deref(), Some("integer"));
        assert_eq!(author.format.as_deref(), Some("int32"));
        let published = param(index, "published").unwrap();
        assert_eq!(published.param_type.as_deref(), Some("string"));
        assert!(published.format.is_none());

        let fields = param(index, "fields").unwrap();
        assert_eq!(fields.param_type.as_deref(), Some("array"));
        assert_eq!(fields.items, Some(Schema::typed("string")));
        assert!(index.parameters.iter().all(|p| !p.required));
    }

    #[test]
    fn test_search_parameter_requires_capability() {
        let resource = articles();
        let paths = CrudOperationBuilder::new(&resource, "/api").build(&crud_routes(), &names());
        let index = paths["/api/articles"].get.as_ref().unwrap();
        assert!(param(index, "search").is_none());
    }

    #[test]
    fn test_index_response_is_array_with_pagination_headers() {
        let resource = articles();
        let paths = CrudOperationBuilder::new(&resource, "/api").build(&crud_routes(), &names());
        let index = paths["/api/articles"].get.as_ref().unwrap();
        let success = &index.responses["200"];
        assert_eq!(success.schema, Some(Schema::array(Schema::reference("Article"))));
        assert!(success.headers.contains_key("X-Total-Count"));
        assert!(success.headers.contains_key("Link"));
    }

    #[test]
    fn test_create_and_update_bodies() {
        let resource = articles();
        let paths = CrudOperationBuilder::new(&resource, "/api").build(&crud_routes(), &names());

        let create = paths["/api/articles"].post.as_ref().unwrap();
        let body = param(create, "article").unwrap();
        assert_eq!(body.location, ParameterLocation::Body);
        assert!(body.required);
        assert_eq!(body.schema, Some(Schema::reference("ArticleInput")));
        assert_eq!(
            create.responses["201"].schema,
            Some(Schema::reference("Article"))
        );
        assert!(create.responses.contains_key("422"));

        let update = paths["/api/articles/{id}"].put.as_ref().unwrap();
        let names: Vec<_> = update.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "fields", "methods", "article"]);
        assert!(param(update, "id").unwrap().required);
        assert_eq!(
            update.responses.keys().cloned().collect::<Vec<_>>(),
            vec!["200", "404", "422"]
        );
    }

    #[test]
    fn test_destroy_has_no_body() {
        let resource = articles();
        let paths = CrudOperationBuilder::new(&resource, "/api").build(&crud_routes(), &names());
        let destroy = paths["/api/articles/{id}"].delete.as_ref().unwrap();
        assert_eq!(destroy.parameters.len(), 1);
        assert_eq!(destroy.parameters[0].location, ParameterLocation::Path);
        assert!(destroy.responses["204"].schema.is_none());
    }

    #[test]
    fn test_methods_parameter_lists_whitelisted_methods() {
        let resource = articles();
        let paths = CrudOperationBuilder::new(&resource, "/api")
            .methods(&["word_count".to_string()])
            .build(&crud_routes(), &names());
        let show = paths["/api/articles/{id}"].get.as_ref().unwrap();
        let items = param(show, "methods").unwrap().items.as_ref().unwrap();
        assert_eq!(items.enum_values, Some(vec![json!("word_count")]));
    }

    #[test]
    fn test_undocumented_custom_routes() {
        let resource = articles();
        let mut routes = crud_routes();
        routes.push(RouteEntry::new(HttpMethod::Post, "/api/articles/:id/publish", "publish"));
        routes.push(RouteEntry::new(HttpMethod::Get, "/api/articles/feed", "feed"));

        let mut assembler = DocumentAssembler::new(&ApiConfig::default());
        assembler.add_paths(CrudOperationBuilder::new(&resource, "/api").build(&routes, &names()));

        let mut publish = PathItem::default();
        publish.set_operation(HttpMethod::Post, Operation::default());
        let mut custom = IndexMap::new();
        custom.insert("/api/articles/{id}/publish".to_string(), publish);
        assembler.add_paths(custom);

        let diagnostics = undocumented_routes("articles", &routes, &assembler);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UndocumentedRoute);
        assert_eq!(
            diagnostics[0].message,
            "articles misses specification for: GET /api/articles/feed"
        );
    }

    #[test]
    fn test_crud_action_parse() {
        assert_eq!(CrudAction::parse("update"), Some(CrudAction::Update));
        assert_eq!(CrudAction::parse("publish"), None);
        assert!(CrudAction::Index.is_collection());
        assert!(!CrudAction::Show.is_collection());
    }
}
