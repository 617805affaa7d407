pub mod assistant;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod render;
pub mod routine;
pub mod selection;
pub mod session;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_support;

pub use assistant::{Assistant, AssistantError, HttpAssistant};
pub use catalog::{Catalog, CatalogSource};
pub use config::AppConfig;
pub use error::PickerError;
pub use selection::{Selection, SelectionStore};
pub use session::PickerSession;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::{ChatMessage, Product, Role};
