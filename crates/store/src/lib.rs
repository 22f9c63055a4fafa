//! `shoestock-store` — the storage contract behind the catalog workflows.
//!
//! One uniform async store interface, parameterized by entity kind, plus an
//! in-memory implementation used by tests, seeding, and dev runs.

pub mod in_memory;
pub mod store;

pub use in_memory::InMemoryStore;
pub use store::{CatalogEntity, EntityStore, StoreError};
