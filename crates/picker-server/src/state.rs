use picker_core::assistant::{Assistant, HttpAssistant};
use picker_core::catalog::{self, Catalog, CatalogSource};
use picker_core::config::AppConfig;
use picker_core::selection::SelectionStore;
use picker_core::session::PickerSession;
use picker_core::storage::FileStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for the server.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub session: Arc<RwLock<PickerSession>>,
    pub catalog_source: Arc<dyn CatalogSource>,
    pub assistant: Arc<dyn Assistant>,
}

impl AppState {
    /// Wire up file storage, the configured catalog source, and the HTTP
    /// assistant, then run the startup load.
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store = Arc::new(FileStore::open(config.storage.resolved_path())?);
        let selection_store = SelectionStore::new(store, &config.storage.key);
        let session = PickerSession::open(selection_store, &config.assistant.system_prompt)?;
        let catalog_source = catalog::source_for(&config.catalog.source);
        let assistant = Arc::new(HttpAssistant::from_config(&config.assistant));

        let state = Self::with_parts(config, session, catalog_source, assistant);
        state.load_initial_catalog().await;
        Ok(state)
    }

    pub fn with_parts(
        config: AppConfig,
        session: PickerSession,
        catalog_source: Arc<dyn CatalogSource>,
        assistant: Arc<dyn Assistant>,
    ) -> Self {
        Self {
            config,
            session: Arc::new(RwLock::new(session)),
            catalog_source,
            assistant,
        }
    }

    /// Page-load step: fetch the catalog once and pre-render any restored
    /// selection. A failed fetch leaves the catalog empty.
    pub async fn load_initial_catalog(&self) {
        match self.catalog_source.load().await {
            Ok(products) => {
                let mut session = self.session.write().await;
                session.set_catalog(Catalog::new(products));
                session.restore_view();
                tracing::info!(
                    "Loaded {} products from {}",
                    session.catalog().len(),
                    self.catalog_source.location()
                );
            }
            Err(e) => {
                tracing::error!(
                    "Failed to load catalog from {}: {}",
                    self.catalog_source.location(),
                    e
                );
            }
        }
    }
}
