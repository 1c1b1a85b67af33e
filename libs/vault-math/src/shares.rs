use crate::full_math::{mul_div, pow10};
use soroban_sdk::Env;
use vault_types::{PRICE_DECIMALS, SHARE_DECIMALS};

/// Value of a token amount at an oracle price, scaled by 10^PRICE_DECIMALS
///
/// `amount` is in the token's smallest units, `price` is the 1e8-scaled
/// price of one whole token.
pub fn value_of(env: &Env, amount: u128, price: u128, decimals: u32) -> u128 {
    mul_div(env, amount, price, pow10(decimals))
}

/// Token amount (smallest units) worth a given 1e8-scaled value
pub fn amount_for_value(env: &Env, value: u128, price: u128, decimals: u32) -> u128 {
    mul_div(env, value, pow10(decimals), price)
}

/// Shares minted for a deposit of `deposit_value`
///
/// The first deposit mints the deposit value rescaled from price decimals to
/// share decimals. Later deposits mint proportionally against `vault_value`,
/// which must already include the deposited funds.
pub fn shares_for_value(
    env: &Env,
    deposit_value: u128,
    total_shares: u128,
    vault_value: u128,
) -> u128 {
    if total_shares == 0 {
        mul_div(
            env,
            deposit_value,
            pow10(SHARE_DECIMALS - PRICE_DECIMALS),
            1,
        )
    } else {
        mul_div(env, total_shares, deposit_value, vault_value)
    }
}

/// Pro-rata portion of `balance` for `share` out of `total_shares` (rounds down)
pub fn proportional(env: &Env, balance: u128, share: u128, total_shares: u128) -> u128 {
    mul_div(env, balance, share, total_shares)
}
