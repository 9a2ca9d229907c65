//! Data models for money, currencies and the fetched budget.

pub mod account;
pub mod amount;
pub mod category;
pub mod currency;
pub mod snapshot;
pub mod transaction;
