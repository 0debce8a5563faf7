//! Named parameter binding
//!
//! Rewrites `:name` bind markers into the placeholder syntax of the
//! configured driver and records parameter names in the order the driver
//! will expect their values.

use serde::Serialize;
use tracing::warn;

use crate::placeholder::{Placeholder, BIND_MARKER};
use crate::scanner::{tokenize, Token, TokenKind};

/// Result of binding one SQL statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// SQL text to hand to the driver
    pub sql: String,

    /// Parameter names, one per placeholder, in source order
    pub params: Vec<String>,
}

/// Whether `token` is a bind marker such as `:name`.
///
/// Markers inside literals and comments are never identifiers, so they
/// never match.
pub fn is_bind_marker(token: &Token<'_>) -> bool {
    token.kind == TokenKind::Identifier && token.text.starts_with(BIND_MARKER)
}

/// Bind marker tokens of `sql`, in source order
pub fn bind_sites(sql: &str) -> impl Iterator<Item = Token<'_>> {
    tokenize(sql).filter(is_bind_marker)
}

/// Name of a bind marker token, without the marker
fn param_name<'a>(token: &Token<'a>) -> &'a str {
    &token.text[BIND_MARKER.len_utf8()..]
}

/// Rewrites bind markers for one placeholder convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binder {
    placeholder: Placeholder,
}

impl Binder {
    /// Create a binder producing `placeholder` syntax
    pub fn new(placeholder: Placeholder) -> Self {
        Self { placeholder }
    }

    /// Create a binder for a driver identifier.
    ///
    /// Unknown drivers get [`Placeholder::FALLBACK`].
    pub fn for_driver(driver: &str) -> Self {
        match Placeholder::for_driver(driver) {
            Some(placeholder) => Self::new(placeholder),
            None => {
                warn!(
                    driver,
                    fallback = %Placeholder::FALLBACK,
                    "unknown database driver, using fallback placeholders"
                );
                Self::new(Placeholder::FALLBACK)
            }
        }
    }

    /// Placeholder convention in use
    pub fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    /// Bind `sql`: collect parameter names and rewrite every marker.
    ///
    /// Names are not deduplicated; a name used twice gets two placeholders.
    pub fn bind(&self, sql: &str) -> Binding {
        let sites: Vec<Token<'_>> = bind_sites(sql).collect();
        let params: Vec<String> = sites.iter().map(|t| param_name(t).to_string()).collect();

        if sites.is_empty() {
            return Binding {
                sql: sql.to_string(),
                params,
            };
        }

        let mut rewritten = String::with_capacity(sql.len() + sites.len());
        let mut copied = 0;
        for (index, site) in sites.iter().enumerate() {
            rewritten.push_str(&sql[copied..site.pos]);
            rewritten.push_str(&self.placeholder.translate(site.text, index));
            copied = site.end();
        }
        rewritten.push_str(&sql[copied..]);

        Binding {
            sql: rewritten,
            params,
        }
    }
}
