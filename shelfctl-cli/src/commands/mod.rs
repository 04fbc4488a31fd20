//! Command implementations for the shelfctl CLI

pub mod migrate;
pub mod models;
pub mod serve;

// Re-export main dispatcher functions for flat access from main.rs
pub use migrate::run_migrate;
pub use models::run_models;
pub use serve::run_serve;
