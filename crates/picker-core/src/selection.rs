use std::sync::Arc;

use crate::error::Result;
use crate::storage::KeyValueStore;

/// Storage key the selected names are mirrored under.
pub const SELECTION_KEY: &str = "selectedProducts";

/// Ordered set of selected product names. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    names: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a name list, dropping repeats (first occurrence wins).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for name in names {
            let name = name.into();
            if !selection.contains(&name) {
                selection.names.push(name);
            }
        }
        selection
    }

    /// Add `name` if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.remove(name) {
            false
        } else {
            self.names.push(name.to_string());
            true
        }
    }

    /// Returns whether `name` was selected.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        self.names.len() != before
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Mirrors a [`Selection`] into a [`KeyValueStore`] under one key.
#[derive(Clone)]
pub struct SelectionStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl SelectionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Read the persisted selection. A missing key is an empty selection, and
    /// so is a value that isn't a JSON list of names.
    pub fn load(&self) -> Result<Selection> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Selection::new());
        };
        match serde_json::from_str::<Option<Vec<String>>>(&raw) {
            Ok(names) => Ok(Selection::from_names(names.unwrap_or_default())),
            Err(e) => {
                tracing::warn!("Ignoring unreadable selection under '{}': {}", self.key, e);
                Ok(Selection::new())
            }
        }
    }

    pub fn save(&self, selection: &Selection) -> Result<()> {
        let json = serde_json::to_string(selection.names())?;
        self.store.set(&self.key, &json)
    }

    pub fn erase(&self) -> Result<()> {
        self.store.remove(&self.key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw persisted value, for checking what actually reached storage.
    #[cfg(test)]
    pub(crate) fn raw(&self) -> Result<Option<String>> {
        self.store.get(&self.key)
    }
}
