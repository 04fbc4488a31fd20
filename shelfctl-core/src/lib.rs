//! shelfctl-core: record types, field validation and configuration
//!
//! Everything here is storage-agnostic. The server crate persists these
//! types; the CLI crate loads [`ShelfConfig`].

pub mod config;
pub mod models;

pub use config::{ConfigError, ShelfConfig};
pub use models::ValidationError;
