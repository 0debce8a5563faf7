//! SQL scanning and parameter binding
//!
//! This crate handles:
//! - Scanning SQL into a lazy token stream (comments, quotes, numbers, operators)
//! - Finding `:name` bind markers outside literals and comments
//! - Rewriting markers into each driver's placeholder syntax
//! - Binding every configured route once at startup
//! - Linting configured queries for the `check` command

pub mod scanner;
pub mod placeholder;
pub mod binder;
pub mod catalog;
pub mod lint;
pub mod error;

pub use scanner::{tokenize, Scanner, Token, TokenKind};
pub use placeholder::{Placeholder, BIND_MARKER};
pub use binder::{bind_sites, is_bind_marker, Binder, Binding};
pub use catalog::{BoundQuery, BoundRoute, RouteCatalog};
pub use lint::{lint_config, lint_query};
pub use error::BindError;
