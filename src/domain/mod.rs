//! Storefront domain: aggregates, value objects, events and the pure rules
//! (pricing, form validation) the checkout pipeline is built from.
pub mod aggregates;
pub mod events;
pub mod pricing;
pub mod shipping;
pub mod value_objects;
