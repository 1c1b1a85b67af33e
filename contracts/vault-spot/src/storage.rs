use soroban_sdk::{contracttype, Address, Env};
use vault_types::SpotVaultConfig;

/// Storage keys for the spot vault contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Vault configuration (Instance storage)
    Config,
    /// Current admin (Instance storage)
    Admin,
    /// Pending admin during a two-step handover (Instance storage)
    PendingAdmin,
    /// Total share supply, 12 decimals (Instance storage)
    TotalShares,
    /// Base-token fees booked by the admin (Instance storage)
    BaseFeeCollected,
    /// Quote-token fees booked by the admin (Instance storage)
    QuoteFeeCollected,
    /// Share balance per holder (Persistent storage)
    Shares(Address),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

/// Extend instance storage TTL
pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

/// Extend persistent storage TTL for a key
fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

// === Config ===

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> SpotVaultConfig {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .expect("Vault not initialized")
}

pub fn set_config(env: &Env, config: &SpotVaultConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

// === Admin ===

pub fn get_admin(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .expect("Vault not initialized")
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

pub fn get_pending_admin(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::PendingAdmin)
        .expect("No pending admin")
}

pub fn set_pending_admin(env: &Env, pending: &Address) {
    env.storage().instance().set(&DataKey::PendingAdmin, pending);
}

pub fn remove_pending_admin(env: &Env) {
    env.storage().instance().remove(&DataKey::PendingAdmin);
}

// === Shares ===

pub fn get_total_shares(env: &Env) -> u128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalShares)
        .unwrap_or(0u128)
}

pub fn set_total_shares(env: &Env, total: u128) {
    env.storage().instance().set(&DataKey::TotalShares, &total);
}

pub fn get_shares(env: &Env, owner: &Address) -> u128 {
    let key = DataKey::Shares(owner.clone());
    env.storage().persistent().get(&key).unwrap_or(0u128)
}

pub fn set_shares(env: &Env, owner: &Address, amount: u128) {
    let key = DataKey::Shares(owner.clone());
    if amount == 0 {
        // Remove empty balance
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
        extend_persistent_ttl(env, &key);
    }
}

// === Fee ledgers ===

pub fn get_base_fee_collected(env: &Env) -> u128 {
    env.storage()
        .instance()
        .get(&DataKey::BaseFeeCollected)
        .unwrap_or(0u128)
}

pub fn set_base_fee_collected(env: &Env, fee: u128) {
    env.storage().instance().set(&DataKey::BaseFeeCollected, &fee);
}

pub fn get_quote_fee_collected(env: &Env) -> u128 {
    env.storage()
        .instance()
        .get(&DataKey::QuoteFeeCollected)
        .unwrap_or(0u128)
}

pub fn set_quote_fee_collected(env: &Env, fee: u128) {
    env.storage().instance().set(&DataKey::QuoteFeeCollected, &fee);
}
