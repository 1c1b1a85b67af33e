use soroban_sdk::{Env, U256};

/// Multiply and divide with 256-bit intermediate precision (rounds down)
/// Returns (a * b) / denominator
pub fn mul_div(env: &Env, a: u128, b: u128, denominator: u128) -> u128 {
    if denominator == 0 {
        panic!("Division by zero");
    }

    let a_256 = U256::from_u128(env, a);
    let b_256 = U256::from_u128(env, b);
    let denom_256 = U256::from_u128(env, denominator);

    let product = a_256.mul(&b_256);
    let result = product.div(&denom_256);

    u128_from_u256(env, &result)
}

/// Convert U256 to u128, panics if overflow
fn u128_from_u256(env: &Env, value: &U256) -> u128 {
    let max_u128 = U256::from_u128(env, u128::MAX);
    if value.gt(&max_u128) {
        panic!("U256 overflow when converting to u128");
    }
    value.to_u128().unwrap()
}

/// Power of ten as u128, valid up to 10^38
pub fn pow10(exp: u32) -> u128 {
    10u128.pow(exp)
}
