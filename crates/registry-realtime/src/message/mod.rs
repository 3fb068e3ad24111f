//! Wire messages and inbound validation.

pub mod types;
pub mod validator;
