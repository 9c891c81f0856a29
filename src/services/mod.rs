pub mod page_store;
pub mod file_store;
pub mod document_store;
pub mod markdown_service;

pub use page_store::{open_store, PageStore};
pub use file_store::FileStore;
pub use document_store::DocumentStore;
pub use markdown_service::MarkdownService;
