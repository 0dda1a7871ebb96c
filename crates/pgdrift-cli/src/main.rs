use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::str::FromStr;

use pgdrift_core::{Category, Config, Script, ScriptStats};
use serde::Serialize;

/// Machine-readable summary of one run (report.json)
#[derive(Serialize)]
struct RunReport {
    /// ISO 8601 generation time
    generated_at: String,

    /// Categories diffed, in execution order
    categories: Vec<String>,

    /// Statement and diagnostic counts over the whole script
    stats: ScriptStats,
}

/// pgdrift - compare the schemas of two PostgreSQL databases
///
/// Generates ALTER statements that can be *manually* run against the second
/// database to reconcile it toward the first.
#[derive(Parser)]
#[command(name = "pgdrift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Category to diff, or "all" for every category in dependency order
    ///
    /// One of: schema, role, function, sequence, table, column, index,
    /// view, matview, owner, foreign_key, grant_relationship,
    /// grant_attribute, trigger
    category: String,

    /// Path to config file (default: pgdrift.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Write a JSON run report (statement/warning counts) to this file
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// First (source-of-truth) database host
    #[arg(long)]
    host1: Option<String>,

    /// First database port
    #[arg(long)]
    port1: Option<u16>,

    /// First database name
    #[arg(long)]
    dbname1: Option<String>,

    /// First database user
    #[arg(long)]
    user1: Option<String>,

    /// First database password
    #[arg(long)]
    password1: Option<String>,

    /// First schema name, or * for all schemas
    #[arg(long)]
    schema1: Option<String>,

    /// First connection options (e.g. sslmode=disable)
    #[arg(long)]
    options1: Option<String>,

    /// Second (target) database host
    #[arg(long)]
    host2: Option<String>,

    /// Second database port
    #[arg(long)]
    port2: Option<u16>,

    /// Second database name
    #[arg(long)]
    dbname2: Option<String>,

    /// Second database user
    #[arg(long)]
    user2: Option<String>,

    /// Second database password
    #[arg(long)]
    password2: Option<String>,

    /// Second schema name, or * for all schemas
    #[arg(long)]
    schema2: Option<String>,

    /// Second connection options
    #[arg(long)]
    options2: Option<String>,
}

impl Cli {
    /// File config first, flags override field by field
    fn resolve_config(&self) -> Result<Config> {
        let mut config = if let Some(path) = &self.config {
            Config::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?
        } else if std::path::Path::new("pgdrift.toml").exists() {
            Config::from_file(std::path::Path::new("pgdrift.toml"))
                .context("loading config from pgdrift.toml")?
        } else {
            if self.verbose {
                eprintln!("{}", "No config file found, using defaults".yellow());
            }
            Config::default()
        };

        let overrides = [
            (&self.host1, &mut config.left.host),
            (&self.dbname1, &mut config.left.dbname),
            (&self.user1, &mut config.left.user),
            (&self.password1, &mut config.left.password),
            (&self.schema1, &mut config.left.schema),
            (&self.options1, &mut config.left.options),
            (&self.host2, &mut config.right.host),
            (&self.dbname2, &mut config.right.dbname),
            (&self.user2, &mut config.right.user),
            (&self.password2, &mut config.right.password),
            (&self.schema2, &mut config.right.schema),
            (&self.options2, &mut config.right.options),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                *field = value.clone();
            }
        }
        if let Some(port) = self.port1 {
            config.left.port = port;
        }
        if let Some(port) = self.port2 {
            config.right.port = port;
        }

        config.validate()?;
        Ok(config)
    }

    /// The categories this invocation diffs, in order
    fn categories(&self) -> Result<Vec<Category>> {
        if self.category.eq_ignore_ascii_case("all") {
            Ok(Category::DEPENDENCY_ORDER.to_vec())
        } else {
            Ok(vec![Category::from_str(&self.category)?])
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let categories = cli.categories()?;

    let script = diff_command(&config, &categories, cli.verbose).await?;

    print!("{}", script.render());

    if let Some(path) = &cli.report {
        let report = RunReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            categories: categories.iter().map(|c| c.as_str().to_string()).collect(),
            stats: script.stats(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }

    if cli.verbose {
        let stats = script.stats();
        eprintln!(
            "{} {} statements, {} warnings, {} errors",
            "Done:".cyan(),
            stats.statements,
            stats.warnings,
            stats.errors
        );
    }
    Ok(())
}

/// Fetch both sides and run the diff for each requested category
#[cfg(feature = "postgres")]
async fn diff_command(
    config: &Config,
    categories: &[Category],
    verbose: bool,
) -> Result<Script> {
    use pgdrift_catalog::{PostgresSource, RecordSource};
    use pgdrift_engine::{diff, schema_object, sort_records};

    if verbose {
        eprintln!("{} {}", "Connecting to".cyan(), config.left);
    }
    let left_source = PostgresSource::connect(&config.left)
        .await
        .context("opening database 1")?;

    if verbose {
        eprintln!("{} {}", "Connecting to".cyan(), config.right);
    }
    let right_source = PostgresSource::connect(&config.right)
        .await
        .context("opening database 2")?;

    left_source
        .test_connection()
        .await
        .context("validating database 1")?;
    right_source
        .test_connection()
        .await
        .context("validating database 2")?;

    let ctx = config.context();
    let mut script = Script::new();
    script.comment(format!(
        "generated by pgdrift at {}",
        chrono::Utc::now().to_rfc3339()
    ));
    script.comment(format!("db1: {}", config.left));
    script.comment(format!("db2: {}", config.right));
    script.comment("Run the following SQL against db2:");

    for category in categories {
        if verbose {
            eprintln!("{} {}", "Comparing".cyan(), category);
        }
        script.comment(format!("category: {}", category));

        // Both sides are fully buffered before the (synchronous) merge runs
        let mut left_rows = left_source
            .fetch(*category)
            .await
            .with_context(|| format!("fetching {} rows from database 1", category))?;
        let mut right_rows = right_source
            .fetch(*category)
            .await
            .with_context(|| format!("fetching {} rows from database 2", category))?;

        // Server-side ORDER BY is collation-dependent; re-sort with the
        // byte order the merge assumes
        sort_records(*category, &mut left_rows);
        sort_records(*category, &mut right_rows);

        let mut left = schema_object(*category, left_rows, &ctx);
        let mut right = schema_object(*category, right_rows, &ctx);
        diff(left.as_mut(), right.as_mut(), &mut script);
    }

    Ok(script)
}

#[cfg(not(feature = "postgres"))]
async fn diff_command(
    _config: &Config,
    _categories: &[Category],
    _verbose: bool,
) -> Result<Script> {
    anyhow::bail!(
        "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres"
    )
}
