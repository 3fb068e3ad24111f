//! # registry-core
//!
//! Core crate for the gift registry backend. Contains configuration
//! schemas, typed identifiers, the [`Money`](types::money::Money) amount
//! type, and the unified error system.
//!
//! This crate has **no** internal dependencies on other registry crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
