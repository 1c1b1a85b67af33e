use soroban_sdk::{contracttype, Address, Symbol};

/// Spot vault configuration - immutable after initialization
#[contracttype]
#[derive(Clone, Debug)]
pub struct SpotVaultConfig {
    /// Spot market contract the vault trades on
    pub market: Address,
    /// Base token address (read from the market)
    pub base_token: Address,
    /// Quote token address (read from the market)
    pub quote_token: Address,
    /// Base token decimals
    pub base_decimals: u32,
    /// Quote token decimals
    pub quote_decimals: u32,
    /// Price oracle contract
    pub oracle: Address,
    /// Oracle feed for the base token
    pub base_feed: Symbol,
    /// Oracle feed for the quote token
    pub quote_feed: Symbol,
    /// Maximum total share supply (12 decimals)
    pub hardcap: u128,
}

/// Perpetual vault configuration - immutable after initialization
#[contracttype]
#[derive(Clone, Debug)]
pub struct PerpVaultConfig {
    /// Derivative market contract the vault trades on
    pub market: Address,
    /// Quote token address (read from the market)
    pub quote_token: Address,
    /// Quote token decimals
    pub quote_decimals: u32,
    /// Maximum total share supply (12 decimals)
    pub hardcap: u128,
}
