//! shelfctl-server: storage, admin registry and HTTP API for the catalogue
//!
//! Books, authors, posts and author profiles are validated by
//! `shelfctl-core`, persisted through a [`db::Store`] (PostgreSQL or
//! in-memory), and exposed as JSON over axum.

pub mod admin;
pub mod db;
pub mod http;
pub mod media;

pub use admin::AdminSite;
pub use db::{create_pool, MemoryStore, PgStore, Store, StoreError};
pub use http::{run_server, AppState, ServerConfig};
pub use media::{FsMediaStore, MediaStore};
