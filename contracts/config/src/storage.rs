use soroban_sdk::{contracttype, Address, Env, Symbol};

#[contracttype]
pub enum DataKey {
    Initialized,
    Developer,
    Platform,
    Factory,
    Mint,
    Token,
    NativeToken,
    Value(Symbol),
    PoolValue(Address, Symbol),
    Wallet(Symbol),
    TokenPrice(Address),
    PriceChangedAt(Address), // u32 ledger sequence of the last accepted price for a token or pool
}

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

pub fn ensure_initialized(env: &Env) {
    if !env.storage().instance().has(&DataKey::Initialized) {
        panic!("not initialized");
    }
    bump_core_ttl(env);
}

pub fn bump_core_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    let persistent = env.storage().persistent();
    for key in [
        DataKey::Developer,
        DataKey::Platform,
        DataKey::Factory,
        DataKey::Mint,
        DataKey::Token,
        DataKey::NativeToken,
    ] {
        if persistent.has(&key) {
            persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
    }
}

fn bump_key(env: &Env, key: &DataKey) {
    let persistent = env.storage().persistent();
    if persistent.has(key) {
        persistent.extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

pub fn developer(env: &Env) -> Address {
    env.storage()
        .persistent()
        .get(&DataKey::Developer)
        .expect("developer not set")
}

pub fn require_developer(env: &Env, developer: &Address) {
    if developer_mismatch(env, developer) {
        panic!("not admin");
    }
    developer.require_auth();
}

fn developer_mismatch(env: &Env, caller: &Address) -> bool {
    developer(env) != *caller
}

pub fn optional_address(env: &Env, key: &DataKey) -> Option<Address> {
    env.storage().persistent().get(key)
}

/// Developer, platform and factory may write pool values.
pub fn require_pool_writer(env: &Env, caller: &Address) {
    let allowed = !developer_mismatch(env, caller)
        || optional_address(env, &DataKey::Platform).as_ref() == Some(caller)
        || optional_address(env, &DataKey::Factory).as_ref() == Some(caller);
    if !allowed {
        panic!("config forbidden");
    }
    caller.require_auth();
}

pub fn get_value(env: &Env, key: &Symbol) -> u128 {
    let k = DataKey::Value(key.clone());
    bump_key(env, &k);
    env.storage().persistent().get(&k).unwrap_or(0u128)
}

pub fn set_value(env: &Env, key: &Symbol, value: u128) {
    let k = DataKey::Value(key.clone());
    env.storage().persistent().set(&k, &value);
    bump_key(env, &k);
}

pub fn get_pool_override(env: &Env, pool: &Address, key: &Symbol) -> Option<u128> {
    let k = DataKey::PoolValue(pool.clone(), key.clone());
    bump_key(env, &k);
    env.storage().persistent().get(&k)
}

pub fn set_pool_value(env: &Env, pool: &Address, key: &Symbol, value: u128) {
    let k = DataKey::PoolValue(pool.clone(), key.clone());
    env.storage().persistent().set(&k, &value);
    bump_key(env, &k);
}

pub fn get_token_price(env: &Env, token: &Address) -> u128 {
    let k = DataKey::TokenPrice(token.clone());
    bump_key(env, &k);
    env.storage().persistent().get(&k).unwrap_or(0u128)
}

pub fn set_token_price(env: &Env, token: &Address, price: u128) {
    let k = DataKey::TokenPrice(token.clone());
    env.storage().persistent().set(&k, &price);
    bump_key(env, &k);
}

pub fn price_changed_at(env: &Env, target: &Address) -> Option<u32> {
    env.storage()
        .persistent()
        .get(&DataKey::PriceChangedAt(target.clone()))
}

pub fn mark_price_changed(env: &Env, target: &Address) {
    let k = DataKey::PriceChangedAt(target.clone());
    env.storage()
        .persistent()
        .set(&k, &env.ledger().sequence());
    bump_key(env, &k);
}

pub fn wallet(env: &Env, name: &Symbol) -> Option<Address> {
    let k = DataKey::Wallet(name.clone());
    bump_key(env, &k);
    env.storage().persistent().get(&k)
}
