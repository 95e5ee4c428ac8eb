//! Tinywiki - a minimal wiki served over HTTP
//!
//! Pages are stored one file per title and bodies may link to other pages
//! with `[Title]` markup.

pub mod components;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod services;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use components::TemplateComponent;
pub use config::Config;
pub use errors::WikiError;
pub use handlers::router;
pub use services::{MarkupService, PageStore};
pub use types::{AppState, Page, Title};

pub use utils::{escape_attr, escape_html, last_modified_html};
