use std::str::FromStr;

use async_trait::async_trait;
use log::{debug, info, warn};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::errors::WikiError;
use crate::services::PageStore;
use crate::types::Page;

/// Page store keeping every save as a new record.
///
/// Records are never updated or deleted; a read returns the one inserted last.
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    /// Connect to `url` and create the `pages` table if it is missing
    pub async fn connect(url: &str) -> Result<Self, WikiError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own empty database.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePool::connect_with(options).await?
        };

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, WikiError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                body BLOB NOT NULL
            )
        "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS pages_title ON pages (title)")
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }

    /// Every stored record for `title`, oldest first
    pub async fn revisions(&self, title: &str) -> Result<Vec<Page>, WikiError> {
        let rows: Vec<(String, Vec<u8>)> =
            sqlx::query_as("SELECT title, body FROM pages WHERE title = ? ORDER BY id")
                .bind(title)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(title, body)| Page::new(title, body)).collect())
    }
}

#[async_trait]
impl PageStore for DocumentStore {
    async fn write(&self, title: &str, body: &[u8]) -> Result<(), WikiError> {
        let id = sqlx::query("INSERT INTO pages (title, body) VALUES (?, ?)")
            .bind(title)
            .bind(body)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        info!("Stored page '{}' as record {}, {} bytes", title, id, body.len());

        // The insert has committed at this point, so the check only logs.
        let stored: Result<Option<(String, Vec<u8>)>, sqlx::Error> =
            sqlx::query_as("SELECT title, body FROM pages WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await;
        match stored {
            Ok(Some((stored_title, stored_body))) if stored_body == body => {
                debug!("Verified storage of page '{}' (record {})", stored_title, id)
            }
            Ok(_) => warn!("Could not verify storage of page '{}' (record {})", title, id),
            Err(e) => warn!("Verification read of page '{}' (record {}) failed: {}", title, id, e),
        }

        Ok(())
    }

    async fn read(&self, title: &str) -> Result<Page, WikiError> {
        let latest: Option<(String, Vec<u8>, i64)> = sqlx::query_as(
            "SELECT title, body, COUNT(*) OVER () FROM pages WHERE title = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        match latest {
            Some((title, body, revisions)) => {
                debug!("Page '{}' has {} stored revisions", title, revisions);
                info!("Read page '{}', {} bytes", title, body.len());
                Ok(Page::new(title, body))
            }
            None => {
                warn!("No records stored for page '{}'", title);
                Err(WikiError::NotFound)
            }
        }
    }
}
