//! Binding errors

/// Errors raised while preparing or feeding bound queries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// Driver has no known placeholder convention and strict mode is on
    #[error("unknown database driver '{driver}' (strict_driver is enabled)")]
    UnknownDriver { driver: String },

    /// A runtime value was not supplied for a bind parameter
    #[error("query '{query}': missing value for parameter '{name}'")]
    MissingParameter { query: String, name: String },
}
