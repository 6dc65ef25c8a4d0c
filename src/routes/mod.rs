//! Route table access and normalization.
//!
//! The router's registered routes reach this crate as [`RawRoute`] values, either given
//! structurally in a manifest or parsed from the router's console listing by
//! [`console::parse_routes_table`]. [`normalizer::normalize`] turns the raw routes of one
//! controller into deduplicated [`RouteEntry`] triples.
//!
//! # Example
//!
//! ```
//! use openapi_from_models::routes::{RawRoute, RouteTable, RouteTableProvider, normalizer};
//!
//! let mut table = RouteTable::new();
//! table.add(RawRoute::new("articles", "GET", "/api/articles(.:format)", "articles#index"));
//! let entries = normalizer::normalize(&table.routes_for("articles"));
//! assert_eq!(entries[0].path, "/api/articles");
//! assert_eq!(entries[0].action, "index");
//! ```

pub mod console;
pub mod normalizer;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Source of registered routes, per controller.
pub trait RouteTableProvider {
    /// Raw routes registered for `controller`, in registration order.
    fn routes_for(&self, controller: &str) -> Vec<RawRoute>;
}

/// A route as registered with the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRoute {
    /// Controller identifier, e.g. `articles` or `admin/users`
    pub controller: String,
    /// HTTP verb, possibly several joined with `|`
    pub verb: String,
    /// Path pattern, possibly carrying a `(.:format)` suffix
    pub path: String,
    /// Action descriptor, e.g. `articles#index {:format=>:json}` or just `index`
    pub action: String,
}

impl RawRoute {
    pub fn new(controller: &str, verb: &str, path: &str, action: &str) -> Self {
        Self {
            controller: controller.to_string(),
            verb: verb.to_string(),
            path: path.to_string(),
            action: action.to_string(),
        }
    }
}

/// HTTP methods that can appear in a route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Parses a verb case-insensitively.
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

/// One normalized route: method, path template and action name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteEntry {
    pub method: HttpMethod,
    /// Path with parameters still in `:param` form
    pub path: String,
    pub action: String,
}

impl RouteEntry {
    pub fn new(method: HttpMethod, path: &str, action: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            action: action.to_string(),
        }
    }

    /// The path with `:param` segments rewritten to `{param}`.
    pub fn template(&self) -> String {
        convert_path_format(&self.path)
    }
}

/// In-memory route table grouped by controller.
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    routes: IndexMap<String, Vec<RawRoute>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, route: RawRoute) {
        self.routes
            .entry(route.controller.clone())
            .or_default()
            .push(route);
    }

    pub fn extend(&mut self, routes: impl IntoIterator<Item = RawRoute>) {
        for route in routes {
            self.add(route);
        }
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RouteTableProvider for RouteTable {
    fn routes_for(&self, controller: &str) -> Vec<RawRoute> {
        self.routes.get(controller).cloned().unwrap_or_default()
    }
}

/// Convert path format from `:param` (or `{param}`) to the `{param}` template form.
pub fn convert_path_format(path: &str) -> String {
    path.split('/')
        .map(|part| match part.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
