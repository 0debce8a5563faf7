//! Integration tests for binding configured routes

use sqlroute_core::{Config, Method, Report};
use sqlroute_sql::{lint_config, tokenize, Placeholder, RouteCatalog, TokenKind};

const CONF: &str = "postgres dbname=shop\n\
\n\
GET /orders\n\
orders: SELECT o.id, o.total\n\
\x20   FROM orders o /* skip :archived /* nested */ */\n\
\x20   WHERE o.customer = :customer\n\
\x20     AND o.note <> 'n/a :x'\n\
\x20     AND o.status = ANY(:statuses) -- :ignored\n\
totals: SELECT sum(total)::numeric FROM orders WHERE customer = :customer\n\
\n\
POST /orders\n\
add: INSERT INTO orders (customer, total) VALUES (:customer, :total)\n";

#[test]
fn end_to_end_conf_to_catalog() {
    let config = Config::from_conf(CONF).unwrap();
    let catalog = RouteCatalog::from_config(&config).unwrap();

    assert_eq!(catalog.placeholder(), Placeholder::Numbered('$'));

    let get = catalog.route(Method::Get, "/orders").unwrap();
    assert_eq!(get.queries.len(), 2);

    let orders = &get.queries[0];
    assert_eq!(orders.params, vec!["customer", "statuses"]);
    assert!(orders.sql.contains("WHERE o.customer = $1"));
    assert!(orders.sql.contains("ANY($2)"));
    assert!(orders.sql.contains("/* skip :archived /* nested */ */"));
    assert!(orders.sql.contains("'n/a :x'"));

    let totals = &get.queries[1];
    assert_eq!(totals.sql, "SELECT sum(total)::numeric FROM orders WHERE customer = $1");

    let post = catalog.route(Method::Post, "/orders").unwrap();
    assert_eq!(
        post.queries[0].sql,
        "INSERT INTO orders (customer, total) VALUES ($1, $2)"
    );
}

#[test]
fn same_config_for_every_driver() {
    let sql = "SELECT * FROM t WHERE a = :a AND b = :b AND c = :a";
    let expected = [
        ("sqlite3", "SELECT * FROM t WHERE a = :a AND b = :b AND c = :a"),
        ("postgres", "SELECT * FROM t WHERE a = $1 AND b = $2 AND c = $3"),
        ("mysql", "SELECT * FROM t WHERE a = ? AND b = ? AND c = ?"),
        ("sqlserver", "SELECT * FROM t WHERE a = @a AND b = @b AND c = @a"),
        ("unknown-driver", "SELECT * FROM t WHERE a = ? AND b = ? AND c = ?"),
    ];

    for (driver, rewritten) in expected {
        let config = Config::from_toml(&format!(
            "driver = \"{}\"\n[[routes]]\npath = \"/t\"\n[[routes.queries]]\nname = \"t\"\nsql = \"{}\"\n",
            driver, sql
        ))
        .unwrap();

        let catalog = RouteCatalog::from_config(&config).unwrap();
        let (_, query) = catalog.queries().next().unwrap();
        assert_eq!(query.sql, rewritten, "driver {}", driver);
        assert_eq!(query.params, vec!["a", "b", "a"], "driver {}", driver);
    }
}

#[test]
fn check_report_for_config() {
    let config = Config::from_conf(
        "oracle\n\
         GET /broken\n\
         q: SELECT 'never closed\n",
    )
    .unwrap();

    let report = Report::from_diagnostics(lint_config(&config));
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.warnings, 1);
    assert!(report.has_errors());

    let json = report.to_json().unwrap();
    assert!(json.contains("DRIVER_UNKNOWN"));
    assert!(json.contains("SQL_UNTERMINATED_STRING"));
}

#[test]
fn catalog_serializes_for_tooling() {
    let config = Config::from_conf("sqlserver\nGET /u\nu: SELECT :id\n").unwrap();
    let catalog = RouteCatalog::from_config(&config).unwrap();

    let json = serde_json::to_value(&catalog).unwrap();
    assert_eq!(json["placeholder"]["style"], "named");
    assert_eq!(json["placeholder"]["marker"], "@");
    assert_eq!(json["routes"][0]["method"], "GET");
    assert_eq!(json["routes"][0]["queries"][0]["sql"], "SELECT @id");
}

#[test]
fn scanning_is_lazy_and_restartable_per_input() {
    let sql = "SELECT :a FROM t";

    let first_marker = tokenize(sql).find(|t| t.kind == TokenKind::Identifier && t.text.starts_with(':'));
    assert_eq!(first_marker.map(|t| t.pos), Some(7));

    // a fresh scan sees the whole input again
    assert_eq!(tokenize(sql).count(), 8);
}
