//! Contracts of the collaborators the checkout core calls into.
//!
//! The core never implements storage or authentication itself; it only
//! sequences calls through these traits.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::aggregates::{Order, Product};
use crate::domain::shipping::ShippingProfile;

/// The signed-in shopper as seen by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// Any backend failure. Callers get no finer distinction than this.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage error")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[automock]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Look up a single product.
    async fn get_by_id(&self, product_id: &str) -> Result<Option<Product>, PersistenceError>;

    /// Products whose category or subcategory equals `tag`, in catalog order.
    async fn list_by_category(&self, tag: &str) -> Result<Vec<Product>, PersistenceError>;
}

#[automock]
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<AuthUser>;
}

#[automock]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a placed order. No partial success is reported.
    async fn insert_order(&self, order: &Order) -> Result<(), PersistenceError>;
}

#[automock]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ShippingProfile>, PersistenceError>;

    async fn upsert_profile(&self, user_id: &str, profile: &ShippingProfile) -> Result<(), PersistenceError>;
}
