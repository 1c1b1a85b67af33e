#![no_std]

mod storage;

use soroban_sdk::{
    contract, contractimpl, token, Address, BytesN, Env, IntoVal, Symbol,
};
use storage::{
    get_admin, get_config, get_fee_collected, get_pending_admin, get_shares, get_total_shares,
    has_config, remove_pending_admin, set_admin, set_config, set_fee_collected, set_pending_admin,
    set_shares, set_total_shares,
};
use vault_math::{mul_div, pow10, proportional};
use vault_types::{MarketInfo, OrderFill, PerpVaultConfig, SHARE_DECIMALS};

#[contract]
pub struct PerpVault;

#[contractimpl]
impl PerpVault {
    /// Initialize a new vault on a derivative market
    ///
    /// The quote token is read from the market contract, which must be active.
    pub fn initialize(
        env: Env,
        admin: Address,
        market: Address,
        quote_decimals: u32,
        hardcap: u128,
    ) {
        if has_config(&env) {
            panic!("Already initialized");
        }

        let info = get_market_info(&env, &market);
        if !info.active {
            panic!("Market not active");
        }

        set_admin(&env, &admin);
        set_config(
            &env,
            &PerpVaultConfig {
                market,
                quote_token: info.quote_token,
                quote_decimals,
                hardcap,
            },
        );
    }

    /// Deposit quote tokens and mint vault shares
    ///
    /// Shares go to `receiver`, or the depositor when no receiver is given.
    pub fn deposit(
        env: Env,
        depositor: Address,
        amount: u128,
        receiver: Option<Address>,
    ) -> u128 {
        depositor.require_auth();

        if amount == 0 {
            panic!("Zero deposit amount");
        }

        let config = get_config(&env);
        let contract = env.current_contract_address();
        token::Client::new(&env, &config.quote_token).transfer(
            &depositor,
            &contract,
            &(amount as i128),
        );

        // First deposit mints the amount rescaled to share decimals; later
        // deposits mint against the free balance including the new funds
        let total_shares = get_total_shares(&env);
        let shares = if total_shares == 0 {
            mul_div(
                &env,
                amount,
                pow10(SHARE_DECIMALS),
                pow10(config.quote_decimals),
            )
        } else {
            mul_div(&env, total_shares, amount, free_balance(&env, &config))
        };
        if shares == 0 {
            panic!("Zero share amount");
        }
        if total_shares + shares > config.hardcap {
            panic!("Hardcap exceeded");
        }

        let receiver = receiver.unwrap_or_else(|| depositor.clone());
        set_shares(&env, &receiver, get_shares(&env, &receiver) + shares);
        set_total_shares(&env, total_shares + shares);

        env.events().publish(
            (Symbol::new(&env, "deposit"),),
            (depositor, receiver, amount, shares),
        );

        shares
    }

    /// Burn shares and receive the pro-rata portion of the free balance
    pub fn withdraw(env: Env, owner: Address, shares: u128) -> u128 {
        owner.require_auth();

        if shares == 0 {
            panic!("Can't withdraw zero amount");
        }

        let config = get_config(&env);
        let balance = get_shares(&env, &owner);
        if balance < shares {
            panic!("Insufficient shares");
        }

        let total_shares = get_total_shares(&env);
        let refund = proportional(&env, free_balance(&env, &config), shares, total_shares);

        set_shares(&env, &owner, balance - shares);
        set_total_shares(&env, total_shares - shares);

        if refund > 0 {
            token::Client::new(&env, &config.quote_token).transfer(
                &env.current_contract_address(),
                &owner,
                &(refund as i128),
            );
        }

        env.events()
            .publish((Symbol::new(&env, "withdraw"),), (owner, shares, refund));

        refund
    }

    /// Place a market order on the derivative market (admin only)
    ///
    /// `price` is in quote units per contract and `quantity` in contracts;
    /// `margin` is the quote collateral committed to the position. The free
    /// balance must cover the order notional.
    ///
    /// # Returns
    /// The fill reported by the market
    pub fn place_order(
        env: Env,
        long: bool,
        price: u128,
        quantity: u128,
        margin: u128,
    ) -> OrderFill {
        require_admin(&env);
        let config = get_config(&env);

        let notional = mul_div(&env, price, quantity, 1);
        if free_balance(&env, &config) < notional {
            panic!("Insufficient balance for order");
        }

        let fill: OrderFill = env.invoke_contract(
            &config.market,
            &Symbol::new(&env, "place_order"),
            (long, price, quantity, margin).into_val(&env),
        );

        env.events().publish(
            (Symbol::new(&env, "order_filled"),),
            (
                fill.order_hash.clone(),
                fill.quantity,
                fill.price,
                fill.fee,
            ),
        );

        fill
    }

    /// Cancel a resting order by hash (admin only)
    pub fn cancel_order(env: Env, order_hash: BytesN<32>) {
        require_admin(&env);
        let config = get_config(&env);

        env.invoke_contract::<()>(
            &config.market,
            &Symbol::new(&env, "cancel_order"),
            (order_hash.clone(),).into_val(&env),
        );

        env.events()
            .publish((Symbol::new(&env, "order_canceled"),), (order_hash,));
    }

    /// Book trading fees against the vault balance (admin only)
    pub fn add_fee(env: Env, fee: u128) {
        require_admin(&env);

        set_fee_collected(&env, get_fee_collected(&env) + fee);

        env.events()
            .publish((Symbol::new(&env, "fee_added"),), (fee,));
    }

    /// Pay out booked fees to the admin (admin only)
    pub fn withdraw_fee(env: Env, fee: u128) {
        let admin = require_admin(&env);

        if fee == 0 {
            panic!("Can't withdraw zero fees");
        }

        let collected = get_fee_collected(&env);
        if collected < fee {
            panic!("Insufficient fee accrued");
        }
        set_fee_collected(&env, collected - fee);

        let config = get_config(&env);
        token::Client::new(&env, &config.quote_token).transfer(
            &env.current_contract_address(),
            &admin,
            &(fee as i128),
        );

        env.events()
            .publish((Symbol::new(&env, "fee_withdrawn"),), (fee,));
    }

    /// Start a two-step admin handover (admin only)
    pub fn transfer_admin(env: Env, new_admin: Address) {
        require_admin(&env);
        set_pending_admin(&env, &new_admin);
    }

    /// Complete the handover; must be called by the pending admin
    pub fn accept_admin(env: Env) -> Address {
        let pending = get_pending_admin(&env);
        pending.require_auth();

        set_admin(&env, &pending);
        remove_pending_admin(&env);

        env.events()
            .publish((Symbol::new(&env, "admin_changed"),), (pending.clone(),));
        pending
    }

    // === View Functions ===

    /// Get current admin
    pub fn admin(env: Env) -> Address {
        get_admin(&env)
    }

    /// Get vault configuration
    pub fn get_config(env: Env) -> PerpVaultConfig {
        get_config(&env)
    }

    /// Get the vault's quote token
    pub fn tokens(env: Env) -> Address {
        get_config(&env).quote_token
    }

    /// Get total share supply
    pub fn total_shares(env: Env) -> u128 {
        get_total_shares(&env)
    }

    /// Get one holder's share balance
    pub fn share_balance(env: Env, owner: Address) -> u128 {
        get_shares(&env, &owner)
    }

    /// Get booked fees
    pub fn fee_collected(env: Env) -> u128 {
        get_fee_collected(&env)
    }

    /// Get the vault balance available to share holders (fees excluded)
    pub fn total_liquidity(env: Env) -> u128 {
        let config = get_config(&env);
        free_balance(&env, &config)
    }

    /// Get the quote amount a holder's shares currently redeem for
    pub fn user_liquidity(env: Env, user: Address) -> u128 {
        let shares = get_shares(&env, &user);
        Self::tokens_for_shares(env, shares)
    }

    /// Get the quote amount a share amount currently redeems for
    pub fn tokens_for_shares(env: Env, shares: u128) -> u128 {
        let config = get_config(&env);
        let total = get_total_shares(&env);
        if total == 0 {
            return 0;
        }
        proportional(&env, free_balance(&env, &config), shares, total)
    }
}

fn require_admin(env: &Env) -> Address {
    let admin = get_admin(env);
    admin.require_auth();
    admin
}

/// Quote balance held by the vault, excluding booked fees
fn free_balance(env: &Env, config: &PerpVaultConfig) -> u128 {
    let contract = env.current_contract_address();
    let balance = token::Client::new(env, &config.quote_token).balance(&contract) as u128;
    balance - get_fee_collected(env)
}

fn get_market_info(env: &Env, market: &Address) -> MarketInfo {
    env.invoke_contract(market, &Symbol::new(env, "get_info"), ().into_val(env))
}
