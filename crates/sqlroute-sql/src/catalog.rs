//! Bound routes, prepared once at startup
//!
//! The catalog binds every configured query once. The result is immutable
//! and can be shared read-only between request handlers.

use serde::Serialize;
use sqlroute_core::{Config, Method, RouteConfig};
use tracing::{debug, info};

use crate::binder::Binder;
use crate::error::BindError;
use crate::placeholder::Placeholder;

/// A configured query after binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundQuery {
    /// Query name, as configured
    pub name: String,

    /// SQL text as configured
    pub original: String,

    /// SQL text in the driver's placeholder syntax
    pub sql: String,

    /// Parameter names, in placeholder order
    pub params: Vec<String>,
}

impl BoundQuery {
    /// Bind one query with `binder`
    pub fn new(binder: &Binder, name: impl Into<String>, sql: impl Into<String>) -> Self {
        let original = sql.into();
        let binding = binder.bind(&original);
        Self {
            name: name.into(),
            original,
            sql: binding.sql,
            params: binding.params,
        }
    }

    /// Order runtime values for the driver.
    ///
    /// `lookup` maps a parameter name to its value; a name used twice is
    /// looked up twice.
    pub fn arguments<V, F>(&self, mut lookup: F) -> Result<Vec<V>, BindError>
    where
        F: FnMut(&str) -> Option<V>,
    {
        self.params
            .iter()
            .map(|name| {
                lookup(name).ok_or_else(|| BindError::MissingParameter {
                    query: self.name.clone(),
                    name: name.clone(),
                })
            })
            .collect()
    }
}

/// A configured route with its bound queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundRoute {
    pub method: Method,
    pub path: String,
    pub queries: Vec<BoundQuery>,
}

impl BoundRoute {
    fn new(binder: &Binder, route: &RouteConfig) -> Self {
        let queries = route
            .queries
            .iter()
            .map(|q| {
                let bound = BoundQuery::new(binder, &q.name, &q.sql);
                debug!(
                    route = %route.path,
                    query = %bound.name,
                    params = ?bound.params,
                    "bound query"
                );
                bound
            })
            .collect();

        Self {
            method: route.method,
            path: route.path.clone(),
            queries,
        }
    }

    /// `METHOD /path`, used in logs and diagnostics
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// All routes of a configuration, bound for its driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteCatalog {
    driver: String,
    placeholder: Placeholder,
    routes: Vec<BoundRoute>,
}

impl RouteCatalog {
    /// Bind every route of `config`.
    ///
    /// An unknown driver falls back to `?` placeholders, unless
    /// `strict_driver` is set.
    pub fn from_config(config: &Config) -> Result<Self, BindError> {
        let binder = match Placeholder::for_driver(&config.driver) {
            Some(placeholder) => Binder::new(placeholder),
            None if config.strict_driver => {
                return Err(BindError::UnknownDriver {
                    driver: config.driver.clone(),
                })
            }
            None => Binder::for_driver(&config.driver),
        };

        let routes: Vec<BoundRoute> = config
            .routes
            .iter()
            .map(|route| BoundRoute::new(&binder, route))
            .collect();

        info!(
            driver = %config.driver,
            placeholder = %binder.placeholder(),
            routes = routes.len(),
            "route catalog ready"
        );

        Ok(Self {
            driver: config.driver.clone(),
            placeholder: binder.placeholder(),
            routes,
        })
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    pub fn routes(&self) -> &[BoundRoute] {
        &self.routes
    }

    /// Find the route registered for `method` and exact `path`
    pub fn route(&self, method: Method, path: &str) -> Option<&BoundRoute> {
        self.routes
            .iter()
            .find(|r| r.method == method && r.path == path)
    }

    /// Iterate over every bound query with its route
    pub fn queries(&self) -> impl Iterator<Item = (&BoundRoute, &BoundQuery)> {
        self.routes
            .iter()
            .flat_map(|route| route.queries.iter().map(move |q| (route, q)))
    }
}
