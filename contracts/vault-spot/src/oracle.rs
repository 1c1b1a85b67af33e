use soroban_sdk::{Address, Env, IntoVal, Symbol};
use vault_types::{PriceData, SpotVaultConfig, MAX_PRICE_AGE};

/// Read both feed prices from the oracle, enforcing freshness
pub fn get_prices(env: &Env, config: &SpotVaultConfig) -> (u128, u128) {
    let base_price = read_price(env, &config.oracle, &config.base_feed);
    let quote_price = read_price(env, &config.oracle, &config.quote_feed);
    (base_price, quote_price)
}

fn read_price(env: &Env, oracle: &Address, feed: &Symbol) -> u128 {
    let price: Option<PriceData> = env.invoke_contract(
        oracle,
        &Symbol::new(env, "lastprice"),
        (feed.clone(),).into_val(env),
    );
    let price = price.expect("Price not available");

    if price.price <= 0 {
        panic!("Invalid oracle price");
    }
    if price.timestamp + MAX_PRICE_AGE < env.ledger().timestamp() {
        panic!("Price too old");
    }

    price.price as u128
}
