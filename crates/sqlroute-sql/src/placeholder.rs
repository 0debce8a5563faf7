//! Driver placeholder conventions
//!
//! Each database driver expects bound parameters in its own syntax: `?`,
//! `$1`, `@name`... A [`Placeholder`] captures one convention and knows how
//! to rewrite a `:name` bind marker into it.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Marker introducing a bind parameter in configured SQL
pub const BIND_MARKER: char = ':';

/// Placeholder convention of a database driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "style", content = "marker", rename_all = "lowercase")]
pub enum Placeholder {
    /// Positional marker repeated for every parameter (`?`)
    Simple(char),

    /// Marker followed by the 1-based parameter position (`$1`, `$2`)
    Numbered(char),

    /// Marker followed by the parameter name (`@name`)
    Named(char),
}

impl Placeholder {
    /// Used for drivers without a known convention
    pub const FALLBACK: Placeholder = Placeholder::Simple('?');

    /// Look up the convention of a known driver
    pub fn for_driver(driver: &str) -> Option<Self> {
        match driver {
            "sqlite3" | "sqlite" => Some(Self::Named(':')),
            "postgres" | "postgresql" | "ql" => Some(Self::Numbered('$')),
            "mysql" => Some(Self::Simple('?')),
            "sqlserver" | "mssql" => Some(Self::Named('@')),
            _ => None,
        }
    }

    /// Convention of `driver`, or [`Placeholder::FALLBACK`] if unknown
    pub fn resolve(driver: &str) -> Self {
        Self::for_driver(driver).unwrap_or(Self::FALLBACK)
    }

    /// The marker character of this convention
    pub fn marker(&self) -> char {
        match *self {
            Self::Simple(c) | Self::Numbered(c) | Self::Named(c) => c,
        }
    }

    /// Rewrite bind marker `original` (e.g. `:name`), found as the
    /// `index`-th (0-based) parameter of its query.
    pub fn translate<'a>(&self, original: &'a str, index: usize) -> Cow<'a, str> {
        // already in the target syntax
        if *self == Self::Numbered(BIND_MARKER) {
            return Cow::Borrowed(original);
        }

        match *self {
            Self::Simple(marker) => Cow::Owned(marker.to_string()),
            Self::Numbered(marker) => Cow::Owned(format!("{}{}", marker, index + 1)),
            Self::Named(BIND_MARKER) => Cow::Borrowed(original),
            Self::Named(marker) => {
                let name = original.strip_prefix(BIND_MARKER).unwrap_or(original);
                Cow::Owned(format!("{}{}", marker, name))
            }
        }
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple(c) => write!(f, "simple({})", c),
            Self::Numbered(c) => write!(f, "numbered({})", c),
            Self::Named(c) => write!(f, "named({})", c),
        }
    }
}
