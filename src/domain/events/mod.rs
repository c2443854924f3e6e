//! Domain events
use crate::domain::value_objects::{LineKey, Money, Quantity};
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", rename_all = "snake_case")]
pub enum DomainEvent {
    Cart(CartEvent),
    Checkout(CheckoutEvent),
}

/// Emitted alongside each cart mutation; presentation and orchestration are
/// both just observers of these.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded { key: LineKey, quantity: Quantity, line_quantity: Quantity },
    ItemRemoved { key: LineKey },
    QuantityChanged { key: LineKey, quantity: Quantity },
    Cleared { lines_removed: usize },
    VisibilityChanged { open: bool },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckoutEvent {
    OrderPlaced { order_id: Uuid, order_number: String, user_id: String, total: Money },
    ProfileSyncFailed { order_id: Uuid, user_id: String, reason: String },
}

impl DomainEvent {
    /// Subject used when the event leaves the process.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Cart(_) => "storefront.cart",
            Self::Checkout(CheckoutEvent::OrderPlaced { .. }) => "storefront.orders.placed",
            Self::Checkout(CheckoutEvent::ProfileSyncFailed { .. }) => "storefront.profiles.sync_failed",
        }
    }
}
