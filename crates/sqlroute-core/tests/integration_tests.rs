//! Integration tests for config loading from disk

use sqlroute_core::{Config, ConfigError, Method};
use std::path::Path;

const TOML_CONFIG: &str = r#"
driver = "postgres"

[[routes]]
path = "/orders/:id"

[[routes.queries]]
name = "order"
sql = "SELECT * FROM orders WHERE id = :id"
"#;

const CONF_CONFIG: &str = "sqlserver server=localhost\n\
GET /orders/:id\n\
order: SELECT * FROM orders WHERE id = :id\n";

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn discover_prefers_the_only_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "app.toml", TOML_CONFIG);

    let config = Config::discover(&dir.path().join("app")).unwrap();
    assert_eq!(config.driver, "postgres");
    assert_eq!(config.project_root, dir.path());
    assert_eq!(config.routes[0].method, Method::Get);
}

#[test]
fn discover_reads_legacy_conf() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "app.conf", CONF_CONFIG);

    let config = Config::discover(&dir.path().join("app")).unwrap();
    assert_eq!(config.driver, "sqlserver");
    assert_eq!(config.data_source.as_deref(), Some("server=localhost"));
    assert_eq!(config.routes[0].queries[0].name, "order");
}

#[test]
fn discover_rejects_two_config_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "app.toml", TOML_CONFIG);
    write(dir.path(), "app.conf", CONF_CONFIG);

    let err = Config::discover(&dir.path().join("app")).unwrap_err();
    assert!(matches!(err, ConfigError::Ambiguous { .. }));
}

#[test]
fn discover_reports_missing_config() {
    let dir = tempfile::tempdir().unwrap();

    let err = Config::discover(&dir.path().join("app")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
    assert!(err.to_string().contains("app.toml"));
}

#[test]
fn save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.toml");

    let config = Config::from_toml(TOML_CONFIG).unwrap();
    config.save_to_file(&path).unwrap();

    let reloaded = Config::from_file(&path).unwrap();
    assert_eq!(reloaded.routes, config.routes);
    assert_eq!(reloaded.driver, config.driver);
}

#[test]
fn conf_syntax_error_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.conf");
    std::fs::write(&path, "sqlite3\nGET /x\nmissing colon\n").unwrap();

    let err = Config::from_conf_file(&path).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("broken.conf:3"), "{}", message);
}
