use crate::storage::get_config;
use crate::vault::free_balances;
use soroban_sdk::{Address, BytesN, Env, IntoVal, Symbol};
use vault_math::{mul_div, pow10};
use vault_types::{MarketInfo, OrderSide, PRICE_DECIMALS};

/// Place a limit order on the market with the vault's own funds
///
/// `price` is 1e8-scaled quote per whole base token, `quantity` is in base
/// token units. The order must be covered by the vault's free balance of the
/// source token (quote for buys, base for sells).
pub fn place_order(env: &Env, side: OrderSide, price: u128, quantity: u128) -> BytesN<32> {
    let config = get_config(env);

    let (free_base, free_quote) = free_balances(env, &config);
    let (available, required) = match side {
        OrderSide::Buy => {
            // Quote units needed to fill the order at `price`
            let cost = mul_div(env, quantity, price, pow10(PRICE_DECIMALS));
            let cost = mul_div(env, cost, pow10(config.quote_decimals), pow10(config.base_decimals));
            (free_quote, cost)
        }
        OrderSide::Sell => (free_base, quantity),
    };
    if available < required {
        panic!("Insufficient balance for order");
    }

    let order_hash = invoke_place_order(env, &config.market, side, price, quantity);

    env.events().publish(
        (Symbol::new(env, "order_placed"),),
        (order_hash.clone(), side, price, quantity),
    );

    order_hash
}

/// Cancel a resting order by its hash
pub fn cancel_order(env: &Env, order_hash: BytesN<32>) {
    let config = get_config(env);

    invoke_cancel_order(env, &config.market, &order_hash);

    env.events()
        .publish((Symbol::new(env, "order_canceled"),), (order_hash,));
}

// === Market contract invocations ===

pub fn get_market_info(env: &Env, market: &Address) -> MarketInfo {
    env.invoke_contract(market, &Symbol::new(env, "get_info"), ().into_val(env))
}

fn invoke_place_order(
    env: &Env,
    market: &Address,
    side: OrderSide,
    price: u128,
    quantity: u128,
) -> BytesN<32> {
    env.invoke_contract(
        market,
        &Symbol::new(env, "place_order"),
        (side, price, quantity).into_val(env),
    )
}

fn invoke_cancel_order(env: &Env, market: &Address, order_hash: &BytesN<32>) {
    env.invoke_contract::<()>(
        market,
        &Symbol::new(env, "cancel_order"),
        (order_hash.clone(),).into_val(env),
    )
}
