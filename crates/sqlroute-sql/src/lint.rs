//! Configuration and query checks
//!
//! The scanner accepts anything, so mistakes such as an unclosed quote
//! silently swallow the rest of a query. These checks turn such cases into
//! diagnostics for the `check` command.

use std::collections::HashSet;

use sqlroute_core::{Config, Diagnostic, DiagnosticCode, Location, Severity};

use crate::placeholder::{Placeholder, BIND_MARKER};
use crate::scanner::{tokenize, Token, TokenKind};

/// Lint one query's SQL
pub fn lint_query(route: &str, query: &str, sql: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let location = |token: &Token<'_>| Location::query(route, query).at_offset(sql, token.pos);

    for token in tokenize(sql) {
        if !token.is_terminated() {
            let (code, what) = match token.kind {
                TokenKind::StringLiteral => (DiagnosticCode::SqlUnterminatedString, "string literal"),
                TokenKind::QuotedIdentifier => {
                    (DiagnosticCode::SqlUnterminatedIdentifier, "quoted identifier")
                }
                _ => (DiagnosticCode::SqlUnterminatedComment, "block comment"),
            };
            diagnostics.push(
                Diagnostic::new(code, Severity::Error, format!("{} is never closed", what))
                    .with_location(location(&token))
                    .with_snippet(snippet(token.text)),
            );
            continue;
        }

        if token.kind.is_opaque() && contains_marker(token.text) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::ParamInLiteral,
                    Severity::Info,
                    "bind marker inside a literal or comment is not bound",
                )
                .with_location(location(&token))
                .with_snippet(snippet(token.text)),
            );
        }

        if token.kind == TokenKind::Identifier && token.text == ":" {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::ParamEmptyName,
                    Severity::Warn,
                    "bind marker without a parameter name",
                )
                .with_location(location(&token)),
            );
        }
    }

    diagnostics
}

/// Lint a whole configuration
pub fn lint_config(config: &Config) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if Placeholder::for_driver(&config.driver).is_none() {
        let severity = if config.strict_driver {
            Severity::Error
        } else {
            Severity::Warn
        };
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::DriverUnknown,
                severity,
                format!(
                    "unknown driver '{}', placeholders fall back to {}",
                    config.driver,
                    Placeholder::FALLBACK
                ),
            ),
        );
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        let label = format!("{} {}", route.method, route.path);

        if !seen.insert((route.method, route.path.as_str())) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::RouteDuplicate,
                    Severity::Error,
                    "route is registered more than once",
                )
                .with_location(Location::route(&label)),
            );
        }

        if route.queries.is_empty() {
            diagnostics.push(
                Diagnostic::new(DiagnosticCode::RouteNoQueries, Severity::Warn, "route has no queries")
                    .with_location(Location::route(&label)),
            );
        }

        for query in &route.queries {
            diagnostics.extend(lint_query(&label, &query.name, &query.sql));
        }
    }

    diagnostics
}

/// `:` followed by a name character, not part of a `::` cast
fn contains_marker(text: &str) -> bool {
    let bytes = text.as_bytes();
    let marker = BIND_MARKER as u8;
    bytes.windows(2).enumerate().any(|(i, pair)| {
        pair[0] == marker
            && (pair[1].is_ascii_alphabetic() || pair[1] == b'_')
            && (i == 0 || bytes[i - 1] != marker)
    })
}

fn snippet(text: &str) -> String {
    const MAX_CHARS: usize = 40;
    if text.chars().count() <= MAX_CHARS {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(MAX_CHARS).collect();
        short.push_str("...");
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlroute_core::{Method, QueryConfig, RouteConfig};

    fn codes(diagnostics: &[Diagnostic]) -> Vec<DiagnosticCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn clean_query_has_no_diagnostics() {
        let diags = lint_query("GET /t", "t", "SELECT a::int FROM t WHERE b = :b -- note");
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn unterminated_tokens() {
        let diags = lint_query("GET /t", "t", "SELECT 'abc");
        assert_eq!(codes(&diags), vec![DiagnosticCode::SqlUnterminatedString]);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[0].location.as_ref().unwrap().column, Some(8));

        let diags = lint_query("GET /t", "t", "SELECT \"abc");
        assert_eq!(codes(&diags), vec![DiagnosticCode::SqlUnterminatedIdentifier]);

        let diags = lint_query("GET /t", "t", "SELECT 1 /* a /* b */");
        assert_eq!(codes(&diags), vec![DiagnosticCode::SqlUnterminatedComment]);
    }

    #[test]
    fn markers_in_literals_are_reported() {
        let diags = lint_query("GET /t", "t", "SELECT ':name', '12:30', x::text /* :y */");
        assert_eq!(
            codes(&diags),
            vec![DiagnosticCode::ParamInLiteral, DiagnosticCode::ParamInLiteral]
        );
        assert_eq!(diags[0].snippet.as_deref(), Some("':name'"));
        assert!(diags.iter().all(|d| d.severity == Severity::Info));
    }

    #[test]
    fn empty_marker_is_reported() {
        let diags = lint_query("GET /t", "t", "SELECT : FROM t");
        assert_eq!(codes(&diags), vec![DiagnosticCode::ParamEmptyName]);
    }

    #[test]
    fn config_level_checks() {
        let route = RouteConfig {
            method: Method::Get,
            path: "/a".to_string(),
            queries: vec![QueryConfig::new("q", "SELECT 'x")],
        };
        let config = Config {
            driver: "oracle".to_string(),
            routes: vec![
                route.clone(),
                route,
                RouteConfig {
                    method: Method::Post,
                    path: "/b".to_string(),
                    queries: Vec::new(),
                },
            ],
            ..Config::default()
        };

        let diags = lint_config(&config);
        assert_eq!(
            codes(&diags),
            vec![
                DiagnosticCode::DriverUnknown,
                DiagnosticCode::SqlUnterminatedString,
                DiagnosticCode::RouteDuplicate,
                DiagnosticCode::SqlUnterminatedString,
                DiagnosticCode::RouteNoQueries,
            ]
        );
        assert_eq!(diags[0].severity, Severity::Warn);
    }

    #[test]
    fn strict_unknown_driver_is_an_error() {
        let config = Config {
            driver: "oracle".to_string(),
            strict_driver: true,
            ..Config::default()
        };
        let diags = lint_config(&config);
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn long_snippets_are_shortened() {
        let text = "x".repeat(100);
        assert_eq!(snippet(&text).len(), 43);
    }
}
