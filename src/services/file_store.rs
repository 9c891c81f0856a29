use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::WikiError;
use crate::services::PageStore;
use crate::types::Page;

/// Page store keeping one `{title}.txt` file per page
#[derive(Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at `base_dir` without touching the filesystem
    pub fn new(base_dir: PathBuf) -> Self {
        debug!("Creating FileStore with base directory: {:?}", base_dir);
        Self { base_dir }
    }

    /// Create the data directory if needed and return a store over it
    pub async fn open(base_dir: PathBuf) -> Result<Self, WikiError> {
        fs::create_dir_all(&base_dir).await.map_err(|e| {
            error!("Failed to create data directory {:?}: {}", base_dir, e);
            WikiError::Io(e)
        })?;
        Ok(Self::new(base_dir))
    }

    fn page_path(&self, title: &str) -> PathBuf {
        self.base_dir.join(format!("{}.txt", title))
    }
}

#[async_trait]
impl PageStore for FileStore {
    async fn write(&self, title: &str, body: &[u8]) -> Result<(), WikiError> {
        let path = self.page_path(title);
        debug!("Writing page '{}' to {:?}", title, path);

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&path).await.map_err(|e| {
            error!("Failed to open {:?} for writing: {}", path, e);
            WikiError::Io(e)
        })?;
        file.write_all(body).await?;
        file.flush().await?;

        info!("Wrote page '{}', {} bytes", title, body.len());
        Ok(())
    }

    async fn read(&self, title: &str) -> Result<Page, WikiError> {
        let path = self.page_path(title);
        debug!("Reading page '{}' from {:?}", title, path);

        match fs::read(&path).await {
            Ok(body) => {
                info!("Read page '{}', {} bytes", title, body.len());
                Ok(Page::new(title, body))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Page file does not exist: {:?}", path);
                Err(WikiError::NotFound)
            }
            Err(e) => {
                error!("Failed to read page file {:?}: {}", path, e);
                Err(WikiError::Io(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_returns_the_same_body() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().to_path_buf()).await.unwrap();

        store.write("squirrel", b"Squirrels are great.").await.unwrap();
        let page = store.read("squirrel").await.unwrap();

        assert_eq!(page, Page::new("squirrel", "Squirrels are great."));
        let on_disk = std::fs::read(dir.path().join("squirrel.txt")).unwrap();
        assert_eq!(on_disk, b"Squirrels are great.");
    }

    #[tokio::test]
    async fn write_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().to_path_buf()).await.unwrap();

        store.write("ruby", b"a much longer first version").await.unwrap();
        store.write("ruby", b"short").await.unwrap();

        assert_eq!(store.read("ruby").await.unwrap().body, b"short");
    }

    #[tokio::test]
    async fn missing_page_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().to_path_buf()).await.unwrap();

        let err = store.read("nope").await.unwrap_err();
        assert!(matches!(err, WikiError::NotFound));
    }

    #[tokio::test]
    async fn open_creates_the_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("wiki").join("data");
        FileStore::open(nested.clone()).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn write_into_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("gone"));

        let err = store.write("test", b"body").await.unwrap_err();
        assert!(matches!(err, WikiError::Io(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn page_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().to_path_buf()).await.unwrap();
        store.write("private", b"x").await.unwrap();

        let mode = std::fs::metadata(dir.path().join("private.txt")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
