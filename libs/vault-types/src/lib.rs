#![no_std]

mod config;
mod market;
mod price;

pub use config::*;
pub use market::*;
pub use price::*;

/// Decimals used for vault shares
pub const SHARE_DECIMALS: u32 = 12;

/// Decimals used for oracle prices (prices are 1e8-scaled)
pub const PRICE_DECIMALS: u32 = 8;

/// Maximum accepted oracle price age in seconds
pub const MAX_PRICE_AGE: u64 = 60;
