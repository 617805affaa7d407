//! Product catalog and the data-file sources it is loaded from.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{PickerError, Result};
use crate::selection::Selection;
use crate::types::{Product, ProductFile};

/// The full product list, immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        let mut by_name = HashMap::with_capacity(products.len());
        for (idx, product) in products.iter().enumerate() {
            // First record wins when a name repeats.
            by_name.entry(product.name.clone()).or_insert(idx);
        }
        Self { products, by_name }
    }

    pub fn find(&self, name: &str) -> Option<&Product> {
        self.by_name.get(name).map(|&idx| &self.products[idx])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| p.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Products of one category, in data-file order.
    pub fn filter_by_category(&self, category: &str) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect()
    }

    /// Catalog products whose names are selected, in data-file order.
    pub fn filter_selected(&self, selection: &Selection) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| selection.contains(&p.name))
            .cloned()
            .collect()
    }

    /// Selected names resolved in selection order; names not in the catalog
    /// are dropped.
    pub fn resolve(&self, selection: &Selection) -> Vec<Product> {
        selection
            .names()
            .iter()
            .filter_map(|name| self.find(name).cloned())
            .collect()
    }
}

/// Where product data comes from. Loaded on startup and on every filter change.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Product>>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}

/// A `{ "products": [...] }` file on local disk.
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn load(&self) -> Result<Vec<Product>> {
        let json = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            PickerError::Catalog(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let file: ProductFile = serde_json::from_str(&json)?;
        Ok(file.products)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// A `{ "products": [...] }` document served over HTTP.
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn load(&self) -> Result<Vec<Product>> {
        let file: ProductFile = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(file.products)
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

/// Pick a source from a configured location: http(s) URLs are fetched,
/// anything else is a file path.
pub fn source_for(location: &str) -> Arc<dyn CatalogSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Arc::new(HttpCatalogSource::new(location))
    } else {
        Arc::new(FileCatalogSource::new(location))
    }
}
