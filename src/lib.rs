//! Strata Pages - a minimal Rust wiki
//!
//! Pages are viewed, edited and saved over HTTP, stored either as flat files
//! or as append-only records in SQLite, and rendered through HTML templates.

pub mod components;
pub mod config;
pub mod errors;
pub mod guard;
pub mod handlers;
pub mod logger;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use components::Templates;
pub use config::{Cli, Config, StoreBackend};
pub use errors::WikiError;
pub use guard::{guard, is_valid_title};
pub use handlers::router;
pub use services::{open_store, DocumentStore, FileStore, MarkdownService, PageStore};
pub use types::{AppState, Page};

/// Open the configured store, load templates and build the router
pub async fn build_app(config: &Config) -> Result<axum::Router, WikiError> {
    let store = open_store(config).await?;
    let templates = Templates::load(&config.templates_dir)?;
    Ok(router(AppState::new(store, templates)))
}
