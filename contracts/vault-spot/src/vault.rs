use crate::oracle;
use crate::storage::{
    get_base_fee_collected, get_config, get_quote_fee_collected, get_shares, get_total_shares,
    set_shares, set_total_shares,
};
use soroban_sdk::{token, Address, Env, Symbol};
use vault_math::{amount_for_value, proportional, shares_for_value, value_of};
use vault_types::SpotVaultConfig;

/// Deposit a value-balanced pair of tokens and mint shares
///
/// Only the largest equal-value portion of the two amounts is pulled from the
/// depositor; the remainder never leaves their balance.
///
/// Returns (shares, base_used, quote_used)
pub fn deposit(
    env: &Env,
    depositor: Address,
    base_amount: u128,
    quote_amount: u128,
    receiver: Option<Address>,
) -> (u128, u128, u128) {
    let config = get_config(env);
    let (base_price, quote_price) = oracle::get_prices(env, &config);

    let base_value = value_of(env, base_amount, base_price, config.base_decimals);
    let quote_value = value_of(env, quote_amount, quote_price, config.quote_decimals);
    let single_value = base_value.min(quote_value);

    let base_used = amount_for_value(env, single_value, base_price, config.base_decimals);
    let quote_used = amount_for_value(env, single_value, quote_price, config.quote_decimals);
    if base_used == 0 || quote_used == 0 {
        panic!("Zero deposit amount");
    }

    let contract = env.current_contract_address();
    token::Client::new(env, &config.base_token).transfer(
        &depositor,
        &contract,
        &(base_used as i128),
    );
    token::Client::new(env, &config.quote_token).transfer(
        &depositor,
        &contract,
        &(quote_used as i128),
    );

    // Value the deposit from the amounts actually pulled
    let deposit_value = value_of(env, base_used, base_price, config.base_decimals)
        + value_of(env, quote_used, quote_price, config.quote_decimals);

    // Vault value is computed after crediting the deposit
    let (free_base, free_quote) = free_balances(env, &config);
    let vault_value = value_of(env, free_base, base_price, config.base_decimals)
        + value_of(env, free_quote, quote_price, config.quote_decimals);

    let total_shares = get_total_shares(env);
    let shares = shares_for_value(env, deposit_value, total_shares, vault_value);
    if shares == 0 {
        panic!("Zero share amount");
    }
    if total_shares + shares > config.hardcap {
        panic!("Hardcap exceeded");
    }

    let receiver = receiver.unwrap_or_else(|| depositor.clone());
    set_shares(env, &receiver, get_shares(env, &receiver) + shares);
    set_total_shares(env, total_shares + shares);

    env.events().publish(
        (Symbol::new(env, "deposit"),),
        (depositor, receiver, base_used, quote_used, shares),
    );

    (shares, base_used, quote_used)
}

/// Burn shares and pay out the pro-rata portion of both free balances
///
/// Returns (base_refund, quote_refund)
pub fn withdraw(env: &Env, owner: Address, shares: u128) -> (u128, u128) {
    if shares == 0 {
        panic!("Can't withdraw zero amount");
    }

    let config = get_config(env);
    let balance = get_shares(env, &owner);
    if balance < shares {
        panic!("Insufficient shares");
    }

    let total_shares = get_total_shares(env);
    let (free_base, free_quote) = free_balances(env, &config);
    let base_refund = proportional(env, free_base, shares, total_shares);
    let quote_refund = proportional(env, free_quote, shares, total_shares);

    set_shares(env, &owner, balance - shares);
    set_total_shares(env, total_shares - shares);

    let contract = env.current_contract_address();
    if base_refund > 0 {
        token::Client::new(env, &config.base_token).transfer(
            &contract,
            &owner,
            &(base_refund as i128),
        );
    }
    if quote_refund > 0 {
        token::Client::new(env, &config.quote_token).transfer(
            &contract,
            &owner,
            &(quote_refund as i128),
        );
    }

    env.events().publish(
        (Symbol::new(env, "withdraw"),),
        (owner, shares, base_refund, quote_refund),
    );

    (base_refund, quote_refund)
}

/// Token balances held by the vault, excluding booked fees
pub fn free_balances(env: &Env, config: &SpotVaultConfig) -> (u128, u128) {
    let contract = env.current_contract_address();
    let base = token::Client::new(env, &config.base_token).balance(&contract) as u128;
    let quote = token::Client::new(env, &config.quote_token).balance(&contract) as u128;
    (
        base - get_base_fee_collected(env),
        quote - get_quote_fee_collected(env),
    )
}
