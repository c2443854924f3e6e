//! Checkout pricing.
//!
//! Pure functions of the cart subtotal and the chosen payment method. Nothing
//! here is persisted on its own; a breakdown only outlives the request inside
//! an order snapshot.

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{Money, PaymentMethod};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRules {
    /// Shipping is free once the subtotal is strictly greater than this.
    pub free_shipping_threshold: Money,
    pub flat_shipping_fee: Money,
    pub cod_surcharge: Money,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_major(100),
            flat_shipping_fee: Money::from_major(10),
            cod_surcharge: Money::from_major(5),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub payment_surcharge: Money,
    pub grand_total: Money,
}

impl PricingBreakdown {
    pub fn has_free_shipping(&self) -> bool { self.shipping_fee.is_zero() }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PricingEngine {
    rules: PricingRules,
}

impl PricingEngine {
    pub fn new(rules: PricingRules) -> Self { Self { rules } }
    pub fn rules(&self) -> &PricingRules { &self.rules }

    pub fn shipping_fee(&self, subtotal: Money) -> Money {
        if subtotal > self.rules.free_shipping_threshold { Money::ZERO } else { self.rules.flat_shipping_fee }
    }

    pub fn payment_surcharge(&self, method: PaymentMethod) -> Money {
        match method {
            PaymentMethod::CashOnDelivery => self.rules.cod_surcharge,
            PaymentMethod::Card => Money::ZERO,
        }
    }

    pub fn quote(&self, subtotal: Money, method: PaymentMethod) -> PricingBreakdown {
        let shipping_fee = self.shipping_fee(subtotal);
        let payment_surcharge = self.payment_surcharge(method);
        PricingBreakdown { subtotal, shipping_fee, payment_surcharge, grand_total: subtotal + shipping_fee + payment_surcharge }
    }

    /// How far the subtotal is from the free-shipping threshold, or `None` when
    /// shipping is already free. The threshold has to be exceeded, so a gap of
    /// zero still means shipping is charged.
    pub fn free_shipping_gap(&self, subtotal: Money) -> Option<Money> {
        if self.shipping_fee(subtotal).is_zero() { return None; }
        Some(self.rules.free_shipping_threshold.saturating_sub(subtotal))
    }
}
