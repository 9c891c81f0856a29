use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::config::{Config, StoreBackend};
use crate::errors::WikiError;
use crate::services::{DocumentStore, FileStore};
use crate::types::Page;

/// Persists and retrieves pages by title.
///
/// `read` returns [`WikiError::NotFound`] when nothing is stored under the title.
/// Any other failure is passed through untouched; implementations never retry.
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn write(&self, title: &str, body: &[u8]) -> Result<(), WikiError>;

    async fn read(&self, title: &str) -> Result<Page, WikiError>;
}

/// Open the store selected by the configuration
pub async fn open_store(config: &Config) -> Result<Arc<dyn PageStore>, WikiError> {
    match config.backend {
        StoreBackend::File => {
            info!("Using file page store at {:?}", config.data_dir);
            let store = FileStore::open(config.data_dir.clone()).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Document => {
            info!("Using document page store at {}", config.database_url);
            let store = DocumentStore::connect(&config.database_url).await?;
            Ok(Arc::new(store))
        }
    }
}
