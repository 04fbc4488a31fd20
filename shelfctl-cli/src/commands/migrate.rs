//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use shelfctl_core::ShelfConfig;
use shelfctl_server::create_pool;
use shelfctl_server::db::migrations;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config and DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,
}

pub async fn run_migrate(args: MigrateArgs, config: ShelfConfig) -> Result<()> {
    let database_url = args.database_url.unwrap_or(config.database.url);
    let pool = create_pool(&database_url, 1)
        .await
        .context("Failed to connect to database")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    println!("Schema is up to date");
    Ok(())
}
