use soroban_sdk::contracttype;

/// Price point returned by the oracle contract (SEP-40 shape)
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceData {
    /// Price scaled by 10^PRICE_DECIMALS
    pub price: i128,
    /// Ledger timestamp the price was recorded at
    pub timestamp: u64,
}
