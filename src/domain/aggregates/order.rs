//! Order Aggregate
//!
//! An order is the snapshot written when checkout completes. It has no
//! mutators; once placed it is only read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use crate::domain::aggregates::cart::CartLine;
use crate::domain::pricing::PricingBreakdown;
use crate::domain::shipping::ShippingProfile;
use crate::domain::value_objects::{Money, PaymentMethod, Quantity};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: Quantity,
    pub size: String,
    pub color: String,
    pub image: String,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(), name: line.name.clone(), unit_price: line.unit_price,
            quantity: line.quantity, size: line.size.clone(), color: line.color.clone(), image: line.image.clone(),
        }
    }
}

impl OrderLine {
    pub fn total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Order {
    id: Uuid,
    order_number: String,
    user_id: String,
    lines: Vec<OrderLine>,
    pricing: PricingBreakdown,
    payment_method: PaymentMethod,
    shipping: ShippingProfile,
    placed_at: DateTime<Utc>,
}

/// `ORD-` plus the 48 random trailing bits of the v7 id, so the number is as
/// unlikely to repeat as the id itself.
fn order_number(id: &Uuid) -> String {
    let tail = id.as_bytes()[10..].iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    format!("ORD-{tail:012X}")
}

impl Order {
    pub fn place(
        user_id: impl Into<String>,
        lines: &[CartLine],
        pricing: PricingBreakdown,
        payment_method: PaymentMethod,
        shipping: ShippingProfile,
    ) -> Result<Self, OrderError> {
        if lines.is_empty() { return Err(OrderError::NoItems); }
        let id = Uuid::now_v7();
        Ok(Self {
            id,
            order_number: order_number(&id),
            user_id: user_id.into(),
            lines: lines.iter().map(OrderLine::from).collect(),
            pricing,
            payment_method,
            shipping,
            placed_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn user_id(&self) -> &str { &self.user_id }
    pub fn lines(&self) -> &[OrderLine] { &self.lines }
    pub fn pricing(&self) -> &PricingBreakdown { &self.pricing }
    pub fn total(&self) -> Money { self.pricing.grand_total }
    pub fn payment_method(&self) -> PaymentMethod { self.payment_method }
    pub fn shipping(&self) -> &ShippingProfile { &self.shipping }
    pub fn placed_at(&self) -> DateTime<Utc> { self.placed_at }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("an order needs at least one line")]
    NoItems,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::cart::tests::line;
    use crate::domain::pricing::PricingEngine;
    use crate::domain::shipping::tests::complete_profile;

    #[test]
    fn test_place_snapshots_lines_and_pricing() {
        let lines = vec![line("1", "M", "Black", 2, 4000), line("2", "S", "Navy", 1, 1500)];
        let pricing = PricingEngine::default().quote(Money::from_major(95), PaymentMethod::CashOnDelivery);
        let order = Order::place("user-1", &lines, pricing, PaymentMethod::CashOnDelivery, complete_profile()).unwrap();

        assert_eq!(order.user_id(), "user-1");
        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.lines()[0].total(), Money::from_major(80));
        assert_eq!(order.total(), Money::from_major(110));
        assert!(order.order_number().starts_with("ORD-"));
        assert_eq!(order.order_number().len(), 16);
        assert_eq!(order.shipping().city, "London");
    }

    #[test]
    fn test_place_requires_lines() {
        let pricing = PricingEngine::default().quote(Money::ZERO, PaymentMethod::Card);
        assert_eq!(Order::place("user-1", &[], pricing, PaymentMethod::Card, complete_profile()), Err(OrderError::NoItems));
    }

    #[test]
    fn test_order_number_follows_id() {
        let id = Uuid::from_u128(0x0190_0000_0000_7000_8000_00ab_cdef_0123);
        assert_eq!(order_number(&id), "ORD-00ABCDEF0123");

        let lines = vec![line("1", "M", "Black", 1, 4000)];
        let pricing = PricingEngine::default().quote(Money::from_major(40), PaymentMethod::Card);
        let numbers: std::collections::HashSet<String> = (0..1_000)
            .map(|_| Order::place("user-1", &lines, pricing, PaymentMethod::Card, complete_profile()).unwrap().order_number().to_string())
            .collect();
        assert_eq!(numbers.len(), 1_000);
    }
}
