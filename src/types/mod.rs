use std::sync::Arc;

use crate::components::Templates;
use crate::services::PageStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PageStore>,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(store: Arc<dyn PageStore>, templates: Templates) -> Self {
        Self { store, templates: Arc::new(templates) }
    }
}

/// A single wiki page.
///
/// The title is only checked at the HTTP boundary, so any string is accepted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self { title: title.into(), body: body.into() }
    }

    /// A page with no stored content yet
    pub fn blank(title: impl Into<String>) -> Self {
        Self { title: title.into(), body: Vec::new() }
    }

    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Values substituted into a page template
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub title: String,
    pub body: String,
    pub content: String,
}
