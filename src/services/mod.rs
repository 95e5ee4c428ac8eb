pub mod markup_service;
pub mod page_store;

pub use markup_service::MarkupService;
pub use page_store::PageStore;
