//! Threat Sentinel CLI
//!
//! Command-line interface for the Threat Sentinel incident-tracking
//! service.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

mod config;

use config::AppConfig;
use ts_api::{ApiServer, ApiServerConfig, AppState};
use ts_core::db::{create_pool, run_migrations, seed_database};
use ts_core::nlq::{execute_readonly, QueryResults};
use ts_core::{LlmTranslator, QueryTranslator, SessionKeys};

#[derive(Parser)]
#[command(name = "threat-sentinel")]
#[command(version)]
#[command(about = "Cybersecurity incident tracking with NL-to-SQL querying", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Address to bind to (overrides configuration)
        #[arg(short, long)]
        bind: Option<String>,

        /// Database URL (overrides configuration)
        #[arg(short, long)]
        database: Option<String>,

        /// Seed fixture data after running migrations
        #[arg(long)]
        seed: bool,

        /// Disable Swagger UI
        #[arg(long)]
        no_swagger: bool,
    },

    /// Initialize the database schema
    InitDb {
        /// Database URL (overrides configuration)
        #[arg(short, long)]
        database: Option<String>,
    },

    /// Seed the database with fixture data
    Seed {
        /// Database URL (overrides configuration)
        #[arg(short, long)]
        database: Option<String>,
    },

    /// Translate natural-language questions to SQL and run them
    Query {
        /// Question to translate; starts an interactive console when
        /// omitted
        question: Option<String>,

        /// Database URL (overrides configuration)
        #[arg(short, long)]
        database: Option<String>,

        /// Print the generated SQL without executing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the resolved configuration
    Config {
        /// Show secrets instead of redacting them
        #[arg(long)]
        show_secrets: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::resolve(cli.config.as_deref())?;

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config
            .logging
            .level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    };

    ts_observability::init_logging_with_config(ts_observability::LoggingConfig {
        level: log_level,
        json_format: config.logging.json_format,
        ..Default::default()
    });

    match cli.command {
        Commands::Serve {
            bind,
            database,
            seed,
            no_swagger,
        } => serve(config, bind, database, seed, no_swagger).await,
        Commands::InitDb { database } => init_db(config, database).await,
        Commands::Seed { database } => seed_command(config, database).await,
        Commands::Query {
            question,
            database,
            dry_run,
        } => query(config, question, database, dry_run).await,
        Commands::Config { show_secrets } => show_config(config, show_secrets),
    }
}

async fn serve(
    config: AppConfig,
    bind: Option<String>,
    database: Option<String>,
    seed: bool,
    no_swagger: bool,
) -> Result<()> {
    let database_url = database.unwrap_or_else(|| config.database_url.clone());
    let bind_address = bind
        .unwrap_or_else(|| config.bind_address.clone())
        .parse()
        .context("Invalid bind address")?;

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    if seed {
        seed_database(&pool).await?;
    }

    let session_keys = if config.session_secret.is_empty() {
        SessionKeys::generate()
    } else {
        SessionKeys::new(config.session_secret.into_bytes())
    };

    let translator = Arc::new(LlmTranslator::new(config.llm));
    let state = AppState::new(pool, translator, session_keys);

    let server = ApiServer::new(
        state,
        ApiServerConfig {
            bind_address,
            enable_swagger: !no_swagger,
            ..Default::default()
        },
    );

    server.run().await.context("API server failed")
}

async fn init_db(config: AppConfig, database: Option<String>) -> Result<()> {
    let database_url = database.unwrap_or_else(|| config.database_url.clone());

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;

    println!("{} database initialized", "✓".green());
    Ok(())
}

async fn seed_command(config: AppConfig, database: Option<String>) -> Result<()> {
    let database_url = database.unwrap_or_else(|| config.database_url.clone());

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    seed_database(&pool).await?;

    println!("{} database seeded", "✓".green());
    Ok(())
}

async fn query(
    config: AppConfig,
    question: Option<String>,
    database: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let database_url = database.unwrap_or_else(|| config.database_url.clone());

    let pool = create_pool(&database_url).await?;
    let translator = LlmTranslator::new(config.llm);

    if let Some(question) = question {
        return run_question(&translator, &pool, &question, dry_run).await;
    }

    // Interactive console.
    println!("Natural-language query console (type 'exit' to quit)");
    loop {
        print!("\n{} ", "question>".cyan());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") {
            break;
        }

        if let Err(e) = run_question(&translator, &pool, line, dry_run).await {
            eprintln!("{} {}", "error:".red(), e);
        }
    }

    Ok(())
}

async fn run_question(
    translator: &LlmTranslator,
    pool: &ts_core::db::DbPool,
    question: &str,
    dry_run: bool,
) -> Result<()> {
    let sql = translator
        .translate(question)
        .await
        .context("Query translation failed")?;

    println!("\n{}\n{}", "Generated SQL:".bold(), sql);

    if dry_run {
        return Ok(());
    }

    let results = execute_readonly(pool, &sql)
        .await
        .context("Query execution failed")?;

    display_results(&results);
    Ok(())
}

/// Renders query results as a fixed-width table.
fn display_results(results: &QueryResults) {
    if results.rows.is_empty() {
        println!("\nNo results found.");
        return;
    }

    let widths: Vec<usize> = results
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            results
                .rows
                .iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(col.len()))
                .max()
                .unwrap_or(0)
                + 2
        })
        .collect();

    let total: usize = widths.iter().sum();

    println!("\n{}", "=".repeat(total));
    let header: String = results
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{:<width$}", col, width = widths[i]))
        .collect();
    println!("{}", header.bold());
    println!("{}", "=".repeat(total));

    for row in &results.rows {
        let line: String = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        println!("{}", line);
    }
    println!("{}", "=".repeat(total));
}

fn show_config(config: AppConfig, show_secrets: bool) -> Result<()> {
    let display = if show_secrets {
        config
    } else {
        config.redact_secrets()
    };

    println!("{}", serde_yaml::to_string(&display)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve() {
        let cli = Cli::try_parse_from([
            "threat-sentinel",
            "serve",
            "--bind",
            "127.0.0.1:9000",
            "--seed",
        ])
        .unwrap();

        match cli.command {
            Commands::Serve { bind, seed, .. } => {
                assert_eq!(bind.as_deref(), Some("127.0.0.1:9000"));
                assert!(seed);
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_cli_parses_query_with_question() {
        let cli = Cli::try_parse_from([
            "threat-sentinel",
            "query",
            "how many phishing incidents this month",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Query {
                question, dry_run, ..
            } => {
                assert_eq!(
                    question.as_deref(),
                    Some("how many phishing incidents this month")
                );
                assert!(dry_run);
            }
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn test_display_results_handles_empty() {
        display_results(&QueryResults::default());
    }
}
