//! PostgreSQL repository implementations of the store traits.

pub mod gift;
pub mod registry;
pub mod user;

pub use gift::GiftRepository;
pub use registry::RegistryRepository;
pub use user::UserRepository;
