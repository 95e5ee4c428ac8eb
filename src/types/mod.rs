use std::sync::Arc;

use crate::components::TemplateComponent;
use crate::services::PageStore;

pub mod title;

pub use title::Title;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PageStore>,
    pub templates: Arc<TemplateComponent>,
}

impl AppState {
    pub fn new(store: PageStore, templates: TemplateComponent) -> Self {
        Self { store: Arc::new(store), templates: Arc::new(templates) }
    }
}

/// A wiki page: its title and raw body bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Title,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: Title, body: impl Into<Vec<u8>>) -> Self {
        Self { title, body: body.into() }
    }

    /// An empty page, used to open a fresh edit form
    pub fn empty(title: Title) -> Self {
        Self { title, body: Vec::new() }
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
