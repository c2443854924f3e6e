//! Product Aggregate
//!
//! Catalog records are owned by the catalog store; the core only reads them
//! when a shopper adds something to the bag.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::aggregates::cart::CartLine;
use crate::domain::value_objects::{Money, Quantity};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub original_price: Option<Money>,
    pub category: String,
    pub subcategory: String,
    #[serde(default)]
    pub colors: Vec<ColorOption>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_sale: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOption { pub name: String, pub hex: String }

impl Product {
    pub fn offers_size(&self, size: &str) -> bool { self.sizes.iter().any(|s| s == size) }
    pub fn offers_color(&self, color: &str) -> bool { self.colors.iter().any(|c| c.name == color) }
    pub fn thumbnail(&self) -> &str { self.images.first().map(String::as_str).unwrap_or_default() }

    /// Tag match against either the top-level category or the subcategory.
    pub fn in_category(&self, tag: &str) -> bool { self.category == tag || self.subcategory == tag }

    /// Snapshots this product into a cart line for the chosen size and color.
    pub fn line_for(&self, size: &str, color: &str, quantity: Quantity) -> Result<CartLine, ProductError> {
        if !self.offers_size(size) { return Err(ProductError::UnknownSize(size.to_string())); }
        if !self.offers_color(color) { return Err(ProductError::UnknownColor(color.to_string())); }
        Ok(CartLine {
            product_id: self.id.clone(),
            size: size.to_string(),
            color: color.to_string(),
            name: self.name.clone(),
            image: self.thumbnail().to_string(),
            quantity,
            unit_price: self.price,
            original_unit_price: self.original_price,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("size {0} is not offered")]
    UnknownSize(String),
    #[error("color {0} is not offered")]
    UnknownColor(String),
}
