//! shelfctl CLI - catalogue service for books, authors, posts and profiles
//!
//! Subcommands:
//! - `serve`: run the JSON API (PostgreSQL or in-memory store)
//! - `migrate`: create the `my_app_*` tables
//! - `models`: print the admin registry

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use shelfctl_core::ShelfConfig;

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "shelfctl",
    author,
    version,
    about = "Catalogue service for books, authors, posts and author profiles",
    long_about = "Validated CRUD over books, authors, posts and author profiles, \
                  backed by PostgreSQL and served as JSON."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: $SHELFCTL_CONFIG or ~/.shelfctl/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create tables, constraints and indexes (idempotent)
    Migrate(commands::migrate::MigrateArgs),
    /// List registered models and their fields
    Models(commands::models::ModelsArgs),
}

fn load_env() {
    // Project .env first, then ~/.shelfctl/.env; existing variables win
    dotenvy::dotenv().ok();
    dotenvy::from_path(ShelfConfig::home_dir().join(".env")).ok();
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    let config = ShelfConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await?,
        Commands::Migrate(args) => commands::run_migrate(args, config).await?,
        Commands::Models(args) => commands::run_models(args)?,
    }
    Ok(())
}
