use tracing::debug;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::conversation::{Conversation, EntryKind, Transcript};
use crate::error::Result;
use crate::selection::{Selection, SelectionStore};
use crate::types::{ChatMessage, Product};

/// Everything one user's picker session holds. Front ends own one of these
/// and change it only through the methods below. A selection change only
/// takes effect once storage has accepted it.
pub struct PickerSession {
    catalog: Catalog,
    view: Option<Vec<Product>>,
    active_category: Option<String>,
    selection: Selection,
    store: SelectionStore,
    conversation: Conversation,
    transcript: Transcript,
}

impl PickerSession {
    /// Start a session, reading the persisted selection once.
    pub fn open(store: SelectionStore, system_prompt: impl Into<String>) -> Result<Self> {
        let selection = store.load()?;
        debug!(
            "Restored {} selected products from '{}'",
            selection.len(),
            store.key()
        );
        Ok(Self {
            catalog: Catalog::default(),
            view: None,
            active_category: None,
            selection,
            store,
            conversation: Conversation::new(system_prompt),
            transcript: Transcript::new(),
        })
    }

    // ── Catalog ─────────────────────────────────────────────────────────

    pub fn set_catalog(&mut self, catalog: Catalog) {
        debug!("Catalog replaced ({} products)", catalog.len());
        self.catalog = catalog;
    }

    /// Startup view: when something is already selected, show those products
    /// without waiting for a category to be chosen.
    pub fn restore_view(&mut self) {
        if !self.selection.is_empty() {
            self.view = Some(self.catalog.filter_selected(&self.selection));
        }
    }

    /// Replace the catalog with a fresh load and show one category of it.
    pub fn apply_filter(&mut self, category: &str, catalog: Catalog) {
        self.set_catalog(catalog);
        let products = self.catalog.filter_by_category(category);
        debug!("Filter '{}' matched {} products", category, products.len());
        self.view = Some(products);
        self.active_category = Some(category.to_string());
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Products currently in the grid. None until a filter is applied or a
    /// selection is restored.
    pub fn view(&self) -> Option<&[Product]> {
        self.view.as_deref()
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active_category.as_deref()
    }

    // ── Selection ───────────────────────────────────────────────────────

    /// Returns whether `name` is selected afterwards.
    pub fn toggle(&mut self, name: &str) -> Result<bool> {
        let mut next = self.selection.clone();
        let selected = next.toggle(name);
        self.store.save(&next)?;
        self.selection = next;
        debug!("Toggled '{}' (selected: {})", name, selected);
        Ok(selected)
    }

    /// Returns whether `name` had been selected.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let mut next = self.selection.clone();
        let removed = next.remove(name);
        self.store.save(&next)?;
        self.selection = next;
        debug!("Removed '{}' (was selected: {})", name, removed);
        Ok(removed)
    }

    /// Empty the selection and erase its persisted copy.
    pub fn clear(&mut self) -> Result<()> {
        self.store.erase()?;
        self.selection.clear();
        debug!("Selection cleared");
        Ok(())
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected names resolved for the tray, in selection order. Names the
    /// catalog no longer has come back as placeholders.
    pub fn tray(&self) -> Vec<Product> {
        self.selection
            .names()
            .iter()
            .map(|name| {
                self.catalog
                    .find(name)
                    .cloned()
                    .unwrap_or_else(|| Product::placeholder(name.as_str()))
            })
            .collect()
    }

    /// Selected products the catalog can resolve; stale names are skipped.
    pub fn selected_products(&self) -> Vec<Product> {
        self.catalog.resolve(&self.selection)
    }

    // ── Conversation ────────────────────────────────────────────────────

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub(crate) fn push_turn(&mut self, message: ChatMessage) {
        self.conversation.push(message);
    }

    pub(crate) fn show(&mut self, kind: EntryKind, text: impl Into<String>) -> Uuid {
        self.transcript.push(kind, text)
    }

    pub(crate) fn unshow(&mut self, id: Uuid) {
        self.transcript.remove(id);
    }
}
