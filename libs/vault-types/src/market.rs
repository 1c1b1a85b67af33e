use soroban_sdk::{contracttype, Address, BytesN};

/// Market metadata returned by a market contract's `get_info`
#[contracttype]
#[derive(Clone, Debug)]
pub struct MarketInfo {
    /// Base token address
    pub base_token: Address,
    /// Quote token address
    pub quote_token: Address,
    /// Whether the market accepts orders
    pub active: bool,
}

/// Order direction for spot orders
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Fill details returned by a derivative market for a market order
#[contracttype]
#[derive(Clone, Debug)]
pub struct OrderFill {
    /// Hash identifying the order on the market
    pub order_hash: BytesN<32>,
    /// Filled quantity in contracts
    pub quantity: u128,
    /// Average fill price in quote units per contract
    pub price: u128,
    /// Trading fee charged, in quote units
    pub fee: u128,
}
