//! Diagnostic codes and error reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Configuration (1xxx)
    /// Driver identifier has no known placeholder style
    DriverUnknown,

    /// Route has no queries attached
    RouteNoQueries,

    /// Same method and path registered twice
    RouteDuplicate,

    // SQL lexical issues (2xxx)
    /// String literal runs to end of input
    SqlUnterminatedString,

    /// Quoted identifier runs to end of input
    SqlUnterminatedIdentifier,

    /// Block comment is never closed
    SqlUnterminatedComment,

    // Bind parameters (3xxx)
    /// Bind marker inside a literal or comment, left untouched
    ParamInLiteral,

    /// A lone `:` marker with no name
    ParamEmptyName,

    // General (9xxx)
    /// General informational message
    Info,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriverUnknown => "DRIVER_UNKNOWN",
            Self::RouteNoQueries => "ROUTE_NO_QUERIES",
            Self::RouteDuplicate => "ROUTE_DUPLICATE",
            Self::SqlUnterminatedString => "SQL_UNTERMINATED_STRING",
            Self::SqlUnterminatedIdentifier => "SQL_UNTERMINATED_IDENTIFIER",
            Self::SqlUnterminatedComment => "SQL_UNTERMINATED_COMMENT",
            Self::ParamInLiteral => "PARAM_IN_LITERAL",
            Self::ParamEmptyName => "PARAM_EMPTY_NAME",
            Self::Info => "INFO",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - should be reviewed but not blocking
    Warn,

    /// Error - blocking issue that should fail CI
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where in the configuration a diagnostic applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Route, as `METHOD /path`
    pub route: String,

    /// Query name within the route
    pub query: Option<String>,

    /// Byte offset in the query text
    pub offset: Option<usize>,

    /// Line number in the query text (1-indexed)
    pub line: Option<usize>,

    /// Column number in the query text (1-indexed, in characters)
    pub column: Option<usize>,
}

impl Location {
    /// Location naming just a route
    pub fn route(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            query: None,
            offset: None,
            line: None,
            column: None,
        }
    }

    /// Location naming a query of a route
    pub fn query(route: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::route(route)
        }
    }

    /// Point at a byte offset inside `sql`, deriving line and column
    pub fn at_offset(mut self, sql: &str, offset: usize) -> Self {
        let before = &sql[..offset.min(sql.len())];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        self.offset = Some(offset);
        self.line = Some(before.matches('\n').count() + 1);
        self.column = Some(before[line_start..].chars().count() + 1);
        self
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.route)?;
        if let Some(query) = &self.query {
            write!(f, " [{}]", query)?;
        }
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, " {}:{}", line, column)?;
        }
        Ok(())
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,

    /// Offending source text, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            snippet: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach the offending source text
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}
