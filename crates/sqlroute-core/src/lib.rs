//! sqlroute Core
//!
//! Core domain model shared by the binder and the CLI: route configuration,
//! stable diagnostic codes and the versioned check report.
//! Never rename diagnostic codes - they are part of the public API.

pub mod diagnostic;
pub mod report;
pub mod config;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, Location};
pub use report::{Report, ReportSummary, ReportVersion};
pub use config::{Config, ConfigError, Method, QueryConfig, RouteConfig};
