//! Cart Aggregate

use serde::{Deserialize, Serialize};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{LineKey, Money, Quantity};

/// One purchasable (product, size, color) selection.
///
/// Display fields and prices are captured when the line is added; later
/// catalog changes never reach an existing line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub size: String,
    pub color: String,
    pub name: String,
    pub image: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub original_unit_price: Option<Money>,
}

impl CartLine {
    pub fn key(&self) -> LineKey { LineKey::new(&self.product_id, &self.size, &self.color) }

    pub fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.size == key.size && self.color == key.color
    }

    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }

    /// Discount against the original price, if the line was added on sale.
    pub fn savings(&self) -> Option<Money> {
        self.original_unit_price
            .filter(|original| *original > self.unit_price)
            .map(|original| (original - self.unit_price).multiply(self.quantity))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    open: bool,
    events: Vec<DomainEvent>,
}

/// Read model of a cart with its derived totals.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub open: bool,
    pub total_items: u64,
    pub total_price: Money,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn line(&self, key: &LineKey) -> Option<&CartLine> { self.lines.iter().find(|l| l.matches(key)) }
    pub fn is_open(&self) -> bool { self.open }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    pub fn total_items(&self) -> u64 { self.lines.iter().map(|l| u64::from(l.quantity.value())).sum() }
    pub fn total_price(&self) -> Money { self.lines.iter().map(CartLine::line_total).sum() }

    pub fn view(&self) -> CartView {
        CartView { lines: self.lines.clone(), open: self.open, total_items: self.total_items(), total_price: self.total_price() }
    }

    /// Merges into an existing line with the same key, otherwise appends.
    /// Adding always surfaces the cart.
    pub fn add_item(&mut self, line: CartLine) {
        let key = line.key();
        let added = line.quantity;
        let line_quantity = match self.lines.iter_mut().find(|l| l.matches(&key)) {
            Some(existing) => {
                existing.quantity = existing.quantity.add(added);
                existing.quantity
            }
            None => {
                self.lines.push(line);
                added
            }
        };
        self.raise_event(CartEvent::ItemAdded { key, quantity: added, line_quantity });
        self.set_open(true);
    }

    pub fn remove_item(&mut self, key: &LineKey) {
        let before = self.lines.len();
        self.lines.retain(|l| !l.matches(key));
        if self.lines.len() != before {
            self.raise_event(CartEvent::ItemRemoved { key: key.clone() });
        }
    }

    /// A requested quantity of zero or less removes the line.
    pub fn update_quantity(&mut self, key: &LineKey, requested: i64) {
        let Some(quantity) = Quantity::from_requested(requested) else {
            self.remove_item(key);
            return;
        };
        if let Some(line) = self.lines.iter_mut().find(|l| l.matches(key)) {
            line.quantity = quantity;
            self.raise_event(CartEvent::QuantityChanged { key: key.clone(), quantity });
        }
    }

    /// Empties the lines; visibility is left alone.
    pub fn clear(&mut self) {
        let lines_removed = self.lines.len();
        self.lines.clear();
        self.raise_event(CartEvent::Cleared { lines_removed });
    }

    pub fn open(&mut self) { self.set_open(true); }
    pub fn close(&mut self) { self.set_open(false); }
    pub fn toggle(&mut self) { self.set_open(!self.open); }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn set_open(&mut self, open: bool) {
        if self.open != open {
            self.open = open;
            self.raise_event(CartEvent::VisibilityChanged { open });
        }
    }

    fn raise_event(&mut self, e: CartEvent) { self.events.push(DomainEvent::Cart(e)); }
}
