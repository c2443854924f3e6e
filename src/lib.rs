//! Storefront
//!
//! Shopping cart, pricing and checkout for a single-currency web shop.
//!
//! ## Features
//! - Product catalog lookups
//! - Session carts with change notifications
//! - Shipping and payment surcharge pricing
//! - Checkout with saved profile hydration
//! - Order persistence and event publishing

pub mod cart_store;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod http;
pub mod infrastructure;
pub mod ports;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart_store::CartStore;
pub use checkout::{CheckoutError, CheckoutOrchestrator, CheckoutOutcome, CheckoutServices, CheckoutState};
pub use config::{Config, ConfigError};
pub use domain::pricing::{PricingBreakdown, PricingEngine, PricingRules};
pub use domain::value_objects::{LineKey, Money, PaymentMethod, Quantity};
