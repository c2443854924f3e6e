//! Read-only catalog held in memory, optionally seeded from a JSON file.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::domain::aggregates::Product;
use crate::ports::{CatalogStore, PersistenceError};

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate product id {0}")]
    DuplicateId(String),
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogLoadError> {
        for (i, p) in products.iter().enumerate() {
            if products[..i].iter().any(|other| other.id == p.id) {
                return Err(CatalogLoadError::DuplicateId(p.id.clone()));
            }
        }
        Ok(Self { products })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogLoadError> { Self::new(serde_json::from_str(json)?) }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let catalog = Self::from_json(&std::fs::read_to_string(path.as_ref())?)?;
        info!(path = %path.as_ref().display(), products = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get_by_id(&self, product_id: &str) -> Result<Option<Product>, PersistenceError> {
        Ok(self.products.iter().find(|p| p.id == product_id).cloned())
    }

    async fn list_by_category(&self, tag: &str) -> Result<Vec<Product>, PersistenceError> {
        Ok(self.products.iter().filter(|p| p.in_category(tag)).cloned().collect())
    }
}
