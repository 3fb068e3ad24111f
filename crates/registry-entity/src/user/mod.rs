//! Visitor documents.

pub mod model;

pub use model::{ClientMetadata, CreateUser, User};
