use soroban_sdk::{Address, Env};

use crate::constants::*;
use crate::storage::*;

pub fn config(env: &Env) -> ConfigClient<'_> {
    let id: Address = env
        .storage()
        .persistent()
        .get(&DataKey::Config)
        .expect("not initialized");
    ConfigClient::new(env, &id)
}

/// Pool bound to the (lend, collateral) pair in the factory index.
pub fn get_pool<'a>(env: &'a Env, lend_token: &Address, collateral_token: &Address) -> PoolClient<'a> {
    let factory = config(env).factory();
    match FactoryClient::new(env, &factory).get_pool(lend_token, collateral_token) {
        Some(pool) => PoolClient::new(env, &pool),
        None => panic!("pool not found"),
    }
}

pub fn native_token(env: &Env) -> Address {
    config(env).native_token()
}

pub fn require_developer(env: &Env, developer: &Address) {
    if config(env).developer() != *developer {
        panic!("not admin");
    }
    developer.require_auth();
}

pub fn bump_core_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    if persistent.has(&DataKey::Config) {
        persistent.extend_ttl(&DataKey::Config, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    if env.storage().instance().has(&DataKey::Initialized) {
        env.storage()
            .instance()
            .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}
