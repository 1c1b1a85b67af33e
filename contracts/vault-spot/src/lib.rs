#![no_std]

mod oracle;
mod orders;
mod storage;
mod vault;

use soroban_sdk::{contract, contractimpl, token, Address, BytesN, Env, Symbol};
use storage::{
    get_admin, get_base_fee_collected, get_config, get_pending_admin, get_quote_fee_collected,
    get_shares, get_total_shares, has_config, remove_pending_admin, set_admin,
    set_base_fee_collected, set_config, set_pending_admin, set_quote_fee_collected,
};
use vault_math::proportional;
use vault_types::{OrderSide, SpotVaultConfig};

#[contract]
pub struct SpotVault;

#[contractimpl]
impl SpotVault {
    /// Initialize a new vault on a spot market
    ///
    /// The token pair is read from the market contract, which must be active.
    pub fn initialize(
        env: Env,
        admin: Address,
        market: Address,
        oracle: Address,
        base_feed: Symbol,
        quote_feed: Symbol,
        base_decimals: u32,
        quote_decimals: u32,
        hardcap: u128,
    ) {
        if has_config(&env) {
            panic!("Already initialized");
        }

        let info = orders::get_market_info(&env, &market);
        if !info.active {
            panic!("Market not active");
        }

        set_admin(&env, &admin);
        set_config(
            &env,
            &SpotVaultConfig {
                market,
                base_token: info.base_token,
                quote_token: info.quote_token,
                base_decimals,
                quote_decimals,
                oracle,
                base_feed,
                quote_feed,
                hardcap,
            },
        );
    }

    /// Deposit both tokens and mint vault shares
    ///
    /// Both amounts are upper bounds; only the largest equal-value portion is
    /// pulled from the depositor. Shares go to `receiver`, or the depositor
    /// when no receiver is given.
    ///
    /// # Returns
    /// (shares, base_used, quote_used)
    pub fn deposit(
        env: Env,
        depositor: Address,
        base_amount: u128,
        quote_amount: u128,
        receiver: Option<Address>,
    ) -> (u128, u128, u128) {
        depositor.require_auth();
        vault::deposit(&env, depositor, base_amount, quote_amount, receiver)
    }

    /// Burn shares and receive the pro-rata portion of both vault balances
    ///
    /// # Returns
    /// (base_refund, quote_refund)
    pub fn withdraw(env: Env, owner: Address, shares: u128) -> (u128, u128) {
        owner.require_auth();
        vault::withdraw(&env, owner, shares)
    }

    /// Place a limit order on the market (admin only)
    ///
    /// # Returns
    /// The order hash assigned by the market
    pub fn place_order(env: Env, side: OrderSide, price: u128, quantity: u128) -> BytesN<32> {
        require_admin(&env);
        orders::place_order(&env, side, price, quantity)
    }

    /// Cancel a resting order by hash (admin only)
    pub fn cancel_order(env: Env, order_hash: BytesN<32>) {
        require_admin(&env);
        orders::cancel_order(&env, order_hash)
    }

    /// Book trading fees against the vault balances (admin only)
    pub fn add_fee(env: Env, base_fee: u128, quote_fee: u128) {
        require_admin(&env);

        set_base_fee_collected(&env, get_base_fee_collected(&env) + base_fee);
        set_quote_fee_collected(&env, get_quote_fee_collected(&env) + quote_fee);

        env.events()
            .publish((Symbol::new(&env, "fee_added"),), (base_fee, quote_fee));
    }

    /// Pay out booked fees to the admin (admin only)
    pub fn withdraw_fee(env: Env, base_fee: u128, quote_fee: u128) {
        let admin = require_admin(&env);

        if base_fee == 0 && quote_fee == 0 {
            panic!("Can't withdraw zero fees");
        }

        let base_collected = get_base_fee_collected(&env);
        let quote_collected = get_quote_fee_collected(&env);
        if base_collected < base_fee || quote_collected < quote_fee {
            panic!("Insufficient fee accrued");
        }

        set_base_fee_collected(&env, base_collected - base_fee);
        set_quote_fee_collected(&env, quote_collected - quote_fee);

        let config = get_config(&env);
        let contract = env.current_contract_address();
        if base_fee > 0 {
            token::Client::new(&env, &config.base_token).transfer(
                &contract,
                &admin,
                &(base_fee as i128),
            );
        }
        if quote_fee > 0 {
            token::Client::new(&env, &config.quote_token).transfer(
                &contract,
                &admin,
                &(quote_fee as i128),
            );
        }

        env.events()
            .publish((Symbol::new(&env, "fee_withdrawn"),), (base_fee, quote_fee));
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
    pub fn get_config(env: Env) -> SpotVaultConfig {
        get_config(&env)
    }

    /// Get the vault's token pair
    pub fn tokens(env: Env) -> (Address, Address) {
        let config = get_config(&env);
        (config.base_token, config.quote_token)
    }

    /// Get total share supply
    pub fn total_shares(env: Env) -> u128 {
        get_total_shares(&env)
    }

    /// Get one holder's share balance
    pub fn share_balance(env: Env, owner: Address) -> u128 {
        get_shares(&env, &owner)
    }

    /// Get booked fees per token
    pub fn fees_collected(env: Env) -> (u128, u128) {
        (get_base_fee_collected(&env), get_quote_fee_collected(&env))
    }

    /// Get vault balances available to share holders (fees excluded)
    pub fn total_liquidity(env: Env) -> (u128, u128) {
        let config = get_config(&env);
        vault::free_balances(&env, &config)
    }

    /// Get the token amounts a holder's shares currently redeem for
    pub fn user_liquidity(env: Env, user: Address) -> (u128, u128) {
        let shares = get_shares(&env, &user);
        Self::tokens_for_shares(env, shares)
    }

    /// Get the token amounts a share amount currently redeems for
    pub fn tokens_for_shares(env: Env, shares: u128) -> (u128, u128) {
        let config = get_config(&env);
        let total = get_total_shares(&env);
        if total == 0 {
            return (0, 0);
        }
        let (free_base, free_quote) = vault::free_balances(&env, &config);
        (
            proportional(&env, free_base, shares, total),
            proportional(&env, free_quote, shares, total),
        )
    }

    /// Get current 1e8-scaled oracle prices for the pair
    pub fn prices(env: Env) -> (u128, u128) {
        let config = get_config(&env);
        oracle::get_prices(&env, &config)
    }
}

fn require_admin(env: &Env) -> Address {
    let admin = get_admin(env);
    admin.require_auth();
    admin
}


#[cfg(test)]
mod tests {
    use super::testutils::{MockMarket, MockMarketClient, MockOracle, MockOracleClient};
    use super::*;
    use soroban_sdk::testutils::{Address as _, Ledger};
    use soroban_sdk::token::StellarAssetClient;
    use soroban_sdk::{symbol_short, Address, Env};
    use vault_math::pow10;
    use vault_types::MarketInfo;

    const BASE_PRICE: i128 = 20_0000_0000; // $20
    const QUOTE_PRICE: i128 = 1_0000_0000; // $1
    const DECIMALS: u32 = 7;

    fn hardcap() -> u128 {
        1_000_000 * pow10(12)
    }

    struct VaultTest {
        env: Env,
        admin: Address,
        user: Address,
        base: Address,
        quote: Address,
        market: Address,
        oracle: Address,
        vault: Address,
    }

    fn setup() -> VaultTest {
        let env = Env::default();
        env.mock_all_auths();

        let admin = Address::generate(&env);
        let user = Address::generate(&env);
        let token_admin = Address::generate(&env);

        let base = env
            .register_stellar_asset_contract_v2(token_admin.clone())
            .address();
        let quote = env
            .register_stellar_asset_contract_v2(token_admin.clone())
            .address();

        let market = env.register(MockMarket, ());
        MockMarketClient::new(&env, &market).set_info(&MarketInfo {
            base_token: base.clone(),
            quote_token: quote.clone(),
            active: true,
        });

        let oracle = env.register(MockOracle, ());
        let oracle_client = MockOracleClient::new(&env, &oracle);
        let now = env.ledger().timestamp();
        oracle_client.set_price(&symbol_short!("BASE"), &BASE_PRICE, &now);
        oracle_client.set_price(&symbol_short!("QUOTE"), &QUOTE_PRICE, &now);

        let vault = env.register(SpotVault, ());
        SpotVaultClient::new(&env, &vault).initialize(
            &admin,
            &market,
            &oracle,
            &symbol_short!("BASE"),
            &symbol_short!("QUOTE"),
            &DECIMALS,
            &DECIMALS,
            &hardcap(),
        );

        // Fund the user: 1000 base, 10000 quote
        StellarAssetClient::new(&env, &base).mint(&user, &1_000_0000000);
        StellarAssetClient::new(&env, &quote).mint(&user, &10_000_0000000);

        VaultTest {
            env,
            admin,
            user,
            base,
            quote,
            market,
            oracle,
            vault,
        }
    }

    fn client<'a>(t: &'a VaultTest) -> SpotVaultClient<'a> {
        SpotVaultClient::new(&t.env, &t.vault)
    }

    // === Initialization Tests ===

    #[test]
    fn test_initialize() {
        let t = setup();
        let c = client(&t);

        assert_eq!(c.admin(), t.admin);
        assert_eq!(c.tokens(), (t.base.clone(), t.quote.clone()));
        assert_eq!(c.total_shares(), 0);
        assert_eq!(c.fees_collected(), (0, 0));

        let config = c.get_config();
        assert_eq!(config.market, t.market);
        assert_eq!(config.oracle, t.oracle);
        assert_eq!(config.hardcap, hardcap());
    }

    #[test]
    #[should_panic(expected = "Already initialized")]
    fn test_initialize_twice_fails() {
        let t = setup();
        client(&t).initialize(
            &t.admin,
            &t.market,
            &t.oracle,
            &symbol_short!("BASE"),
            &symbol_short!("QUOTE"),
            &DECIMALS,
            &DECIMALS,
            &hardcap(),
        );
    }

    #[test]
    #[should_panic(expected = "Market not active")]
    fn test_initialize_inactive_market() {
        let t = setup();
        MockMarketClient::new(&t.env, &t.market).set_info(&MarketInfo {
            base_token: t.base.clone(),
            quote_token: t.quote.clone(),
            active: false,
        });

        let vault = t.env.register(SpotVault, ());
        SpotVaultClient::new(&t.env, &vault).initialize(
            &t.admin,
            &t.market,
            &t.oracle,
            &symbol_short!("BASE"),
            &symbol_short!("QUOTE"),
            &DECIMALS,
            &DECIMALS,
            &hardcap(),
        );
    }

    // === Deposit Tests ===

    #[test]
    fn test_first_deposit_pulls_balanced_amounts() {
        let t = setup();
        let c = client(&t);

        // 10 base ($200) against 500 quote ($500): quote leg capped at $200
        let (shares, base_used, quote_used) =
            c.deposit(&t.user, &10_0000000, &500_0000000, &None);

        assert_eq!(base_used, 10_0000000);
        assert_eq!(quote_used, 200_0000000);
        // $400 deposit value at 12 decimals
        assert_eq!(shares, 400 * pow10(12));
        assert_eq!(c.total_shares(), shares);
        assert_eq!(c.share_balance(&t.user), shares);

        // Only the used amounts left the depositor
        let base_token = soroban_sdk::token::Client::new(&t.env, &t.base);
        let quote_token = soroban_sdk::token::Client::new(&t.env, &t.quote);
        assert_eq!(base_token.balance(&t.user), 990_0000000);
        assert_eq!(quote_token.balance(&t.user), 9_800_0000000);
        assert_eq!(c.total_liquidity(), (10_0000000, 200_0000000));
    }

    #[test]
    fn test_deposit_to_receiver() {
        let t = setup();
        let c = client(&t);
        let receiver = Address::generate(&t.env);

        let (shares, _, _) =
            c.deposit(&t.user, &10_0000000, &200_0000000, &Some(receiver.clone()));

        assert_eq!(c.share_balance(&receiver), shares);
        assert_eq!(c.share_balance(&t.user), 0);
    }

    #[test]
    fn test_second_deposit_values_vault_after_credit() {
        let t = setup();
        let c = client(&t);

        let user2 = Address::generate(&t.env);
        StellarAssetClient::new(&t.env, &t.base).mint(&user2, &10_0000000);
        StellarAssetClient::new(&t.env, &t.quote).mint(&user2, &200_0000000);

        let (first, _, _) = c.deposit(&t.user, &10_0000000, &200_0000000, &None);
        let (second, _, _) = c.deposit(&user2, &10_0000000, &200_0000000, &None);

        // Shares are minted against the vault value including the new funds
        assert_eq!(second, first / 2);
        assert_eq!(c.total_shares(), first + second);
    }

    #[test]
    #[should_panic(expected = "Zero deposit amount")]
    fn test_deposit_zero_leg() {
        let t = setup();
        client(&t).deposit(&t.user, &0, &200_0000000, &None);
    }

    #[test]
    #[should_panic(expected = "Hardcap exceeded")]
    fn test_deposit_over_hardcap() {
        let t = setup();

        // A vault capped at 100 shares (12 decimals) rejects a $400 deposit
        let vault = t.env.register(SpotVault, ());
        let c = SpotVaultClient::new(&t.env, &vault);
        c.initialize(
            &t.admin,
            &t.market,
            &t.oracle,
            &symbol_short!("BASE"),
            &symbol_short!("QUOTE"),
            &DECIMALS,
            &DECIMALS,
            &(100 * pow10(12)),
        );
        c.deposit(&t.user, &10_0000000, &200_0000000, &None);
    }

    #[test]
    #[should_panic(expected = "Price too old")]
    fn test_deposit_stale_price() {
        let t = setup();
        t.env.ledger().with_mut(|li| li.timestamp += 1000);
        client(&t).deposit(&t.user, &10_0000000, &200_0000000, &None);
    }

    #[test]
    fn test_deposit_price_within_window() {
        let t = setup();
        t.env.ledger().with_mut(|li| li.timestamp += 30);
        let (shares, _, _) = client(&t).deposit(&t.user, &10_0000000, &200_0000000, &None);
        assert_eq!(shares, 400 * pow10(12));
    }

    #[test]
    #[should_panic(expected = "Invalid oracle price")]
    fn test_deposit_zero_price() {
        let t = setup();
        let now = t.env.ledger().timestamp();
        MockOracleClient::new(&t.env, &t.oracle).set_price(&symbol_short!("BASE"), &0, &now);
        client(&t).deposit(&t.user, &10_0000000, &200_0000000, &None);
    }

    #[test]
    #[should_panic(expected = "Invalid oracle price")]
    fn test_deposit_negative_price() {
        let t = setup();
        let now = t.env.ledger().timestamp();
        MockOracleClient::new(&t.env, &t.oracle).set_price(&symbol_short!("QUOTE"), &-1, &now);
        client(&t).deposit(&t.user, &10_0000000, &200_0000000, &None);
    }

    #[test]
    #[should_panic(expected = "Price not available")]
    fn test_deposit_missing_feed() {
        let t = setup();

        // A vault pointed at a feed the oracle has never published
        let vault = t.env.register(SpotVault, ());
        let c = SpotVaultClient::new(&t.env, &vault);
        c.initialize(
            &t.admin,
            &t.market,
            &t.oracle,
            &symbol_short!("BASE"),
            &symbol_short!("OTHER"),
            &DECIMALS,
            &DECIMALS,
            &hardcap(),
        );
        c.deposit(&t.user, &10_0000000, &200_0000000, &None);
    }

    // === Withdraw Tests ===

    #[test]
    fn test_withdraw_half() {
        let t = setup();
        let c = client(&t);

        let (shares, _, _) = c.deposit(&t.user, &10_0000000, &200_0000000, &None);
        let (base_refund, quote_refund) = c.withdraw(&t.user, &(shares / 2));

        assert_eq!(base_refund, 5_0000000);
        assert_eq!(quote_refund, 100_0000000);
        assert_eq!(c.share_balance(&t.user), shares / 2);
        assert_eq!(c.total_shares(), shares / 2);
        assert_eq!(c.total_liquidity(), (5_0000000, 100_0000000));
    }

    #[test]
    fn test_withdraw_all_empties_vault() {
        let t = setup();
        let c = client(&t);

        let (shares, _, _) = c.deposit(&t.user, &10_0000000, &200_0000000, &None);
        c.withdraw(&t.user, &shares);

        assert_eq!(c.total_shares(), 0);
        assert_eq!(c.total_liquidity(), (0, 0));

        let base_token = soroban_sdk::token::Client::new(&t.env, &t.base);
        assert_eq!(base_token.balance(&t.user), 1_000_0000000);
    }

    #[test]
    #[should_panic(expected = "Can't withdraw zero amount")]
    fn test_withdraw_zero() {
        let t = setup();
        client(&t).withdraw(&t.user, &0);
    }

    #[test]
    #[should_panic(expected = "Insufficient shares")]
    fn test_withdraw_more_than_balance() {
        let t = setup();
        let c = client(&t);
        let (shares, _, _) = c.deposit(&t.user, &10_0000000, &200_0000000, &None);
        c.withdraw(&t.user, &(shares + 1));
    }

    // === Fee Tests ===

    #[test]
    fn test_fees_excluded_from_liquidity() {
        let t = setup();
        let c = client(&t);

        let (shares, _, _) = c.deposit(&t.user, &10_0000000, &200_0000000, &None);
        c.add_fee(&1_0000000, &10_0000000);

        assert_eq!(c.fees_collected(), (1_0000000, 10_0000000));
        assert_eq!(c.total_liquidity(), (9_0000000, 190_0000000));
        assert_eq!(c.tokens_for_shares(&(shares / 2)), (4_5000000, 95_0000000));
    }

    #[test]
    fn test_withdraw_fee_pays_admin() {
        let t = setup();
        let c = client(&t);

        c.deposit(&t.user, &10_0000000, &200_0000000, &None);
        c.add_fee(&1_0000000, &10_0000000);
        c.withdraw_fee(&1_0000000, &4_0000000);

        assert_eq!(c.fees_collected(), (0, 6_0000000));
        let base_token = soroban_sdk::token::Client::new(&t.env, &t.base);
        let quote_token = soroban_sdk::token::Client::new(&t.env, &t.quote);
        assert_eq!(base_token.balance(&t.admin), 1_0000000);
        assert_eq!(quote_token.balance(&t.admin), 4_0000000);
    }

    #[test]
    #[should_panic(expected = "Can't withdraw zero fees")]
    fn test_withdraw_fee_both_zero() {
        let t = setup();
        client(&t).withdraw_fee(&0, &0);
    }

    #[test]
    #[should_panic(expected = "Insufficient fee accrued")]
    fn test_withdraw_fee_over_accrued() {
        let t = setup();
        let c = client(&t);
        c.add_fee(&1_0000000, &0);
        c.withdraw_fee(&2_0000000, &0);
    }

    // === Order Tests ===

    #[test]
    fn test_place_buy_order() {
        let t = setup();
        let c = client(&t);
        c.deposit(&t.user, &10_0000000, &200_0000000, &None);

        // Buy 5 base at $20: $100 in quote, covered by the 200 quote held
        let hash = c.place_order(&OrderSide::Buy, &(BASE_PRICE as u128), &5_0000000);

        let market = MockMarketClient::new(&t.env, &t.market);
        assert_eq!(market.order_count(), 1);
        let (side, price, quantity) = market.last_order();
        assert_eq!(side, OrderSide::Buy);
        assert_eq!(price, BASE_PRICE as u128);
        assert_eq!(quantity, 5_0000000);

        c.cancel_order(&hash);
        assert!(market.is_canceled(&hash));
    }

    #[test]
    fn test_place_sell_order() {
        let t = setup();
        let c = client(&t);
        c.deposit(&t.user, &10_0000000, &200_0000000, &None);

        c.place_order(&OrderSide::Sell, &(BASE_PRICE as u128), &10_0000000);
        assert_eq!(MockMarketClient::new(&t.env, &t.market).order_count(), 1);
    }

    #[test]
    #[should_panic(expected = "Insufficient balance for order")]
    fn test_place_sell_order_over_balance() {
        let t = setup();
        let c = client(&t);
        c.deposit(&t.user, &10_0000000, &200_0000000, &None);

        c.place_order(&OrderSide::Sell, &(BASE_PRICE as u128), &20_0000000);
    }

    #[test]
    #[should_panic(expected = "Insufficient balance for order")]
    fn test_place_buy_order_over_balance() {
        let t = setup();
        let c = client(&t);
        c.deposit(&t.user, &10_0000000, &200_0000000, &None);

        // Buy 20 base at $20 = $400 in quote; vault only holds 200 quote
        c.place_order(&OrderSide::Buy, &(BASE_PRICE as u128), &20_0000000);
    }

    #[test]
    fn test_buy_order_excludes_fees_from_cover() {
        let t = setup();
        let c = client(&t);
        c.deposit(&t.user, &10_0000000, &200_0000000, &None);
        c.add_fee(&0, &150_0000000);

        // Only 50 quote is free: a $100 buy no longer fits
        let result = c.try_place_order(&OrderSide::Buy, &(BASE_PRICE as u128), &5_0000000);
        assert!(result.is_err());
    }

    // === Query Tests ===

    #[test]
    fn test_prices() {
        let t = setup();
        assert_eq!(client(&t).prices(), (BASE_PRICE as u128, QUOTE_PRICE as u128));
    }

    #[test]
    fn test_user_liquidity() {
        let t = setup();
        let c = client(&t);

        c.deposit(&t.user, &10_0000000, &200_0000000, &None);
        assert_eq!(c.user_liquidity(&t.user), (10_0000000, 200_0000000));

        let stranger = Address::generate(&t.env);
        assert_eq!(c.user_liquidity(&stranger), (0, 0));
    }

    // === Admin Handover Tests ===

    #[test]
    fn test_admin_handover() {
        let t = setup();
        let c = client(&t);

        let new_admin = Address::generate(&t.env);
        c.transfer_admin(&new_admin);
        // Handover is pending until accepted
        assert_eq!(c.admin(), t.admin);

        assert_eq!(c.accept_admin(), new_admin);
        assert_eq!(c.admin(), new_admin);
    }

    #[test]
    #[should_panic(expected = "No pending admin")]
    fn test_accept_admin_without_pending() {
        let t = setup();
        client(&t).accept_admin();
    }
}
