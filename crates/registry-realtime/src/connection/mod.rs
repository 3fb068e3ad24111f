//! Connection lifecycle: handles, the connection table, and its manager.

pub mod handle;
pub mod manager;
pub mod pool;
