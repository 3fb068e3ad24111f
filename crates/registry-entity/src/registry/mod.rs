//! Registry item documents.

pub mod model;

pub use model::{CreateRegistryItem, RegistryItem, RegistryItemView};
