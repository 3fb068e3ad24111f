//! # registry-entity
//!
//! Document models for the gift registry. Every struct in this crate
//! represents a database row or a value object derived from one. Row
//! types additionally derive `sqlx::FromRow`.
//!
//! Field names serialize in camelCase, which is the shape clients see
//! on the socket.

pub mod gift;
pub mod registry;
pub mod user;
