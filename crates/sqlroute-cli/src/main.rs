use clap::{Parser, Subcommand};
use colored::Colorize;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sqlroute_core::{Config, Report, Severity};
use sqlroute_sql::{lint_config, tokenize, RouteCatalog};

/// sqlroute - bind named SQL parameters for your database driver
#[derive(Parser)]
#[command(name = "sqlroute")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: sqlroute.toml or sqlroute.conf)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind every configured query and print the driver SQL
    Bind {
        /// Print the bound routes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the token stream of a SQL statement
    Tokens {
        /// SQL text to scan
        sql: Option<String>,

        /// Read the SQL from a file instead
        #[arg(short, long, conflicts_with = "sql")]
        file: Option<PathBuf>,
    },

    /// Check configured queries and write a report
    Check {
        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match cli.command {
        Commands::Bind { json } => {
            let config = load_config(cli.config.as_deref(), cli.verbose)?;
            bind_command(&config, json)
        }
        Commands::Tokens { sql, file } => tokens_command(sql, file.as_deref()),
        Commands::Check { output } => {
            let config = load_config(cli.config.as_deref(), cli.verbose)?;
            check_command(&config, &output, cli.verbose)
        }
    }
}

/// Load the config named on the command line, or discover `sqlroute.*`
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = match path {
        Some(path) if path.extension().is_some_and(|ext| ext == "conf") => {
            Config::from_conf_file(path)?
        }
        Some(path) => Config::from_file(path)?,
        None => Config::discover(Path::new("sqlroute"))?,
    };

    tracing::debug!(driver = %config.driver, routes = config.routes.len(), "config loaded");

    if verbose {
        eprintln!(
            "{} driver {} with {} route(s), {} query(ies)",
            "Using".cyan(),
            config.driver,
            config.routes.len(),
            config.query_count()
        );
    }

    Ok(config)
}

/// Bind command - print the driver SQL of every configured query
fn bind_command(config: &Config, json: bool) -> Result<()> {
    let catalog = RouteCatalog::from_config(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    println!("{} {} ({})", "Driver:".bold(), catalog.driver(), catalog.placeholder());
    for route in catalog.routes() {
        println!();
        println!("{}", route.label().bold());
        for query in &route.queries {
            println!("  {} {}", query.name.green(), query.sql);
            if !query.params.is_empty() {
                println!("    {} {}", "params:".dimmed(), query.params.join(", "));
            }
        }
    }

    Ok(())
}

/// Tokens command - dump the scanner output
fn tokens_command(sql: Option<String>, file: Option<&Path>) -> Result<()> {
    let sql = match (sql, file) {
        (Some(sql), _) => sql,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("provide SQL text or --file"),
    };

    for token in tokenize(&sql) {
        println!("{:>5}  {}", token.pos, token);
    }

    Ok(())
}

/// Check command - lint configured queries
fn check_command(config: &Config, output: &Path, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("{}", "Checking configured queries...".cyan());
    }

    let diagnostics = lint_config(config);
    let mut report = Report::from_diagnostics(diagnostics);

    report.summary.routes_checked = config.routes.len();
    report.summary.queries_bound = config.query_count();
    // strict mode errors are already in the diagnostics; bind leniently for the counts
    let lenient = Config {
        strict_driver: false,
        ..config.clone()
    };
    let catalog = RouteCatalog::from_config(&lenient)?;
    report.summary.parameters = catalog.queries().map(|(_, q)| q.params.len()).sum();

    let report = report.with_metadata(serde_json::json!({
        "driver": config.driver,
        "placeholder": catalog.placeholder().to_string(),
    }));

    report
        .save_to_file(output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    for diag in &report.diagnostics {
        let severity = match diag.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warn => "warn".yellow().bold(),
            Severity::Info => "info".blue(),
        };
        let location = diag
            .location
            .as_ref()
            .map(|l| format!(" {}", l))
            .unwrap_or_default();
        println!("{}[{}]{}: {}", severity, diag.code, location, diag.message);
        if let Some(snippet) = &diag.snippet {
            println!("    {}", snippet.dimmed());
        }
    }

    println!(
        "\n{} {} routes, {} queries, {} parameters: {} error(s), {} warning(s)",
        "Checked".green().bold(),
        report.summary.routes_checked,
        report.summary.queries_bound,
        report.summary.parameters,
        report.summary.errors,
        report.summary.warnings,
    );
    println!("{} {}", "Report written to".cyan(), output.display());

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
