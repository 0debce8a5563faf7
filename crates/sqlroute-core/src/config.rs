//! Configuration schema (sqlroute.toml and the legacy sqlroute.conf)

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// HTTP method a route is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Read-only queries, run in a read-only transaction
    Get,

    /// Statements executed for their side effects
    Post,
}

impl Default for Method {
    fn default() -> Self {
        Self::Get
    }
}

impl Method {
    /// Upper-case method name, as written in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single named SQL statement of a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Name of the result table produced by this query
    pub name: String,

    /// Raw SQL text, using `:name` bind markers
    pub sql: String,
}

impl QueryConfig {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// A route: path pattern plus the queries run when it matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// HTTP method
    #[serde(default)]
    pub method: Method,

    /// Path pattern, without file extension
    pub path: String,

    /// Queries, in execution order
    #[serde(default)]
    pub queries: Vec<QueryConfig>,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Database driver identifier (sqlite3, postgres, mysql, sqlserver, ...)
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Driver-specific data source, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,

    /// Reject driver identifiers that have no known placeholder style
    /// instead of falling back to `?` placeholders
    #[serde(default)]
    pub strict_driver: bool,

    /// Configured routes
    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

fn default_driver() -> String {
    "sqlite3".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            data_source: None,
            strict_driver: false,
            routes: Vec::new(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Load config from a legacy `.conf` file
    pub fn from_conf_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = ConfParser::new(&path.display().to_string()).parse(&contents)?;

        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from a legacy `.conf` string
    ///
    /// The first line is `<driver> [data source]`. Routes follow as blocks
    /// separated by blank lines: a `GET <path>` or `POST <path>` line, then
    /// `name: sql` lines. Lines starting with whitespace continue the
    /// previous query.
    pub fn from_conf(contents: &str) -> Result<Self, ConfigError> {
        ConfParser::new("<string>").parse(contents)
    }

    /// Find the config for `base`, trying `base.toml` then `base.conf`.
    ///
    /// Exactly one of the two must exist.
    pub fn discover(base: &Path) -> Result<Self, ConfigError> {
        let toml_path = with_suffix(base, ".toml");
        let conf_path = with_suffix(base, ".conf");

        match (toml_path.exists(), conf_path.exists()) {
            (true, true) => Err(ConfigError::Ambiguous {
                toml: toml_path,
                conf: conf_path,
            }),
            (true, false) => Self::from_file(&toml_path),
            (false, true) => Self::from_conf_file(&conf_path),
            (false, false) => Err(ConfigError::NotFound {
                toml: toml_path,
                conf: conf_path,
            }),
        }
    }

    /// Total number of configured queries across all routes
    pub fn query_count(&self) -> usize {
        self.routes.iter().map(|r| r.queries.len()).sum()
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Line-oriented parser for the legacy `.conf` format
struct ConfParser<'a> {
    file: &'a str,
    line: usize,

    routes: Vec<RouteConfig>,

    // route being built; `None` until a method line is seen
    current: Option<RouteConfig>,
    // current query text, possibly joined from several lines
    pending: Option<QueryConfig>,
}

impl<'a> ConfParser<'a> {
    fn new(file: &'a str) -> Self {
        Self {
            file,
            line: 0,
            routes: Vec::new(),
            current: None,
            pending: None,
        }
    }

    fn parse(mut self, contents: &str) -> Result<Config, ConfigError> {
        let mut lines = contents.lines();

        self.line = 1;
        let header = lines
            .next()
            .ok_or_else(|| self.error("missing driver line"))?;
        let (driver, data_source) = Self::parse_driver_line(header);
        if driver.is_empty() {
            return Err(self.error("missing driver name"));
        }

        for line in lines {
            self.line += 1;
            self.next_line(line)?;
        }
        self.finish_route();

        Ok(Config {
            driver,
            data_source,
            routes: self.routes,
            ..Config::default()
        })
    }

    fn parse_driver_line(line: &str) -> (String, Option<String>) {
        match line.trim().split_once(' ') {
            Some((driver, options)) => {
                let options = options.trim();
                let data_source = (!options.is_empty()).then(|| options.to_string());
                (driver.trim().to_string(), data_source)
            }
            None => (line.trim().to_string(), None),
        }
    }

    fn next_line(&mut self, line: &str) -> Result<(), ConfigError> {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            self.finish_route();
            return Ok(());
        }

        if let Some(method) = Self::method_prefix(line) {
            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() != 2 || fields[0] != method.as_str() {
                return Err(self.error("invalid path line"));
            }
            self.finish_route();
            self.current = Some(RouteConfig {
                method,
                path: fields[1].to_string(),
                queries: Vec::new(),
            });
            return Ok(());
        }

        let starts_with_space = line.chars().next().is_some_and(char::is_whitespace);
        if !starts_with_space {
            if self.current.is_none() {
                return Err(self.error("query outside of a GET/POST block"));
            }
            self.flush_query();
            let (name, sql) = trimmed
                .split_once(':')
                .ok_or_else(|| self.error("missing ':'"))?;
            self.pending = Some(QueryConfig::new(name.trim(), sql.trim()));
            return Ok(());
        }

        match self.pending.as_mut() {
            Some(query) => {
                query.sql.push(' ');
                query.sql.push_str(trimmed);
                Ok(())
            }
            None => Err(self.error("continuation line without a query")),
        }
    }

    fn method_prefix(line: &str) -> Option<Method> {
        if line.starts_with("GET") {
            Some(Method::Get)
        } else if line.starts_with("POST") {
            Some(Method::Post)
        } else {
            None
        }
    }

    fn flush_query(&mut self) {
        if let (Some(query), Some(route)) = (self.pending.take(), self.current.as_mut()) {
            route.queries.push(query);
        }
    }

    fn finish_route(&mut self) {
        self.flush_query();
        if let Some(route) = self.current.take() {
            self.routes.push(route);
        }
    }

    fn error(&self, message: &str) -> ConfigError {
        ConfigError::Syntax {
            file: self.file.to_string(),
            line: self.line,
            message: message.to_string(),
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("{file}:{line}: {message}")]
    Syntax {
        file: String,
        line: usize,
        message: String,
    },

    #[error("both {} and {} config files exist", .toml.display(), .conf.display())]
    Ambiguous { toml: PathBuf, conf: PathBuf },

    #[error("config file not found (looking for {} or {})", .toml.display(), .conf.display())]
    NotFound { toml: PathBuf, conf: PathBuf },
}
