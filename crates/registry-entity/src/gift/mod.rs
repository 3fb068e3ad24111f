//! Gift documents and their payment records.

pub mod model;
pub mod transaction;

pub use model::{CreateGift, Gift, GiftComment};
pub use transaction::PaymentTransaction;
