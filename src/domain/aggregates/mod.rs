//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{ColorOption, Product, ProductError};
pub use order::{Order, OrderError, OrderLine};
pub use cart::{Cart, CartLine, CartView};
