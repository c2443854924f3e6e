//! Adapters for the external collaborators.
pub mod catalog;
pub mod identity;
pub mod nats;
pub mod postgres;

pub use catalog::{CatalogLoadError, InMemoryCatalog};
pub use identity::SessionIdentity;
pub use nats::NatsEventPublisher;
pub use postgres::{PgOrderStore, PgProfileStore};
