use soroban_sdk::{contracttype, Address, Env};
use vault_types::PerpVaultConfig;

/// Storage keys for the perpetual vault contract
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
    /// Quote-token fees booked by the admin (Instance storage)
    FeeCollected,
    /// Share balance per holder (Persistent storage)
    Shares(Address),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> PerpVaultConfig {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .expect("Vault not initialized")
}

pub fn set_config(env: &Env, config: &PerpVaultConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

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
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
        extend_persistent_ttl(env, &key);
    }
}

pub fn get_fee_collected(env: &Env) -> u128 {
    env.storage()
        .instance()
        .get(&DataKey::FeeCollected)
        .unwrap_or(0u128)
}

pub fn set_fee_collected(env: &Env, fee: u128) {
    env.storage().instance().set(&DataKey::FeeCollected, &fee);
}
