//! Session-scoped cart handle.
//!
//! `CartStore` is the single source of truth for what is in the bag. Clones
//! share the same cart; every mutation runs under one exclusive write lock so
//! the no-duplicate-key and positive-quantity invariants hold even when UI
//! callbacks race. Events raised by a mutation are broadcast before the lock
//! is released, so observers see them in mutation order.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::domain::aggregates::{Cart, CartLine, CartView};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::{LineKey, Money};

const EVENT_CAPACITY: usize = 64;

#[derive(Clone, Debug)]
pub struct CartStore {
    cart: Arc<RwLock<Cart>>,
    events: broadcast::Sender<DomainEvent>,
}

impl Default for CartStore {
    fn default() -> Self { Self::new() }
}

impl CartStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { cart: Arc::new(RwLock::new(Cart::new())), events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> { self.events.subscribe() }

    pub async fn add_item(&self, line: CartLine) {
        debug!(key = %line.key(), quantity = %line.quantity, "add item");
        self.mutate(|cart| cart.add_item(line)).await;
    }

    pub async fn remove_item(&self, key: &LineKey) {
        debug!(%key, "remove item");
        self.mutate(|cart| cart.remove_item(key)).await;
    }

    pub async fn update_quantity(&self, key: &LineKey, quantity: i64) {
        debug!(%key, quantity, "update quantity");
        self.mutate(|cart| cart.update_quantity(key, quantity)).await;
    }

    pub async fn clear_cart(&self) { self.mutate(Cart::clear).await; }
    pub async fn open_cart(&self) { self.mutate(Cart::open).await; }
    pub async fn close_cart(&self) { self.mutate(Cart::close).await; }
    pub async fn toggle_cart(&self) { self.mutate(Cart::toggle).await; }

    pub async fn lines(&self) -> Vec<CartLine> { self.cart.read().await.lines().to_vec() }
    pub async fn is_empty(&self) -> bool { self.cart.read().await.is_empty() }
    pub async fn is_open(&self) -> bool { self.cart.read().await.is_open() }
    pub async fn total_items(&self) -> u64 { self.cart.read().await.total_items() }
    pub async fn total_price(&self) -> Money { self.cart.read().await.total_price() }
    pub async fn view(&self) -> CartView { self.cart.read().await.view() }

    async fn mutate<F: FnOnce(&mut Cart)>(&self, f: F) {
        let mut cart = self.cart.write().await;
        f(&mut cart);
        for event in cart.take_events() {
            // No subscribers is fine.
            self.events.send(event).ok();
        }
    }
}
