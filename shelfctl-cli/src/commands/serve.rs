//! HTTP server command
//!
//! Resolves settings from flags, then config/environment, and runs the API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use shelfctl_core::ShelfConfig;
use shelfctl_server::db::{migrations, Store};
use shelfctl_server::http::{run_server, AppState, ServerConfig};
use shelfctl_server::{create_pool, FsMediaStore, MemoryStore, PgStore};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Database URL (overrides config and DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Keep everything in process memory instead of PostgreSQL
    #[arg(long, conflicts_with = "database_url")]
    pub in_memory: bool,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Directory uploaded avatars are written under
    #[arg(long, value_name = "DIR")]
    pub media_root: Option<PathBuf>,
}

/// Run the HTTP server until shutdown.
pub async fn run_serve(args: ServeArgs, config: ShelfConfig) -> Result<()> {
    let server_config = ServerConfig {
        bind_addr: args.bind.unwrap_or(config.server.bind),
        cors_permissive: args.cors_permissive || config.server.cors_permissive,
        request_timeout: Duration::from_secs(config.server.request_timeout_secs),
    };
    let media_root = args.media_root.unwrap_or(config.media.root);

    let store: Arc<dyn Store> = if args.in_memory {
        tracing::warn!("Using in-memory store - data is lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        let database_url = args.database_url.unwrap_or(config.database.url);
        let pool = create_pool(&database_url, config.database.max_connections)
            .await
            .context("Failed to create database pool")?;
        migrations::run(&pool)
            .await
            .context("Failed to run migrations")?;
        Arc::new(PgStore::new(pool))
    };

    tracing::info!(
        bind = %server_config.bind_addr,
        media_root = %media_root.display(),
        "Starting shelfctl server"
    );

    let state = AppState::new(store, Arc::new(FsMediaStore::new(media_root)));

    // Run server (blocks until shutdown)
    run_server(state, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
