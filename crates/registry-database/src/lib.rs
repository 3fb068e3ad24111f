//! # registry-database
//!
//! PostgreSQL connection management, the store traits the service layer
//! is written against, their sqlx repository implementations, and a
//! process-local store for development and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{GiftStore, RecordedGift, RegistryStore, Stores, UserStore};
