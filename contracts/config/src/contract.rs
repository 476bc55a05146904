use soroban_sdk::{contract, contractimpl, Address, Env, String, Symbol, Vec};

use crate::constants::*;
use crate::events::*;
use crate::storage::*;

#[contract]
pub struct PairlendConfig;

#[contractimpl]
impl PairlendConfig {
    /// Initialize the registry. The developer becomes the governance address.
    pub fn initialize(
        env: Env,
        developer: Address,
        platform: Address,
        factory: Address,
        native_token: Address,
    ) {
        if env.storage().instance().has(&DataKey::Initialized) {
            panic!("already initialized");
        }
        if let Some(expected) = option_env!("PAIRLEND_INIT_DEVELOPER") {
            let expected = Address::from_string(&String::from_str(&env, expected));
            if developer != expected {
                panic!("unexpected developer");
            }
        }
        developer.require_auth();
        let storage = env.storage().persistent();
        storage.set(&DataKey::Developer, &developer);
        storage.set(&DataKey::Platform, &platform);
        storage.set(&DataKey::Factory, &factory);
        storage.set(&DataKey::NativeToken, &native_token);
        env.storage().instance().set(&DataKey::Initialized, &true);
        bump_core_ttl(&env);
        NewDeveloper { developer }.publish(&env);
    }

    /// Register the emission contract and the protocol token it pays out.
    pub fn set_mint(env: Env, developer: Address, mint: Address, token: Address) {
        ensure_initialized(&env);
        require_developer(&env, &developer);
        env.storage().persistent().set(&DataKey::Mint, &mint);
        env.storage().persistent().set(&DataKey::Token, &token);
        bump_core_ttl(&env);
    }

    pub fn set_developer(env: Env, developer: Address, new_developer: Address) {
        ensure_initialized(&env);
        require_developer(&env, &developer);
        env.storage()
            .persistent()
            .set(&DataKey::Developer, &new_developer);
        NewDeveloper {
            developer: new_developer,
        }
        .publish(&env);
    }

    pub fn init_parameter(env: Env, developer: Address) {
        ensure_initialized(&env);
        require_developer(&env, &developer);
        for (name, value) in DEFAULT_PARAMS {
            let key = Symbol::new(&env, name);
            set_value(&env, &key, value);
            ParameterChanged { key, value }.publish(&env);
        }
    }

    pub fn set_parameter(env: Env, developer: Address, keys: Vec<Symbol>, values: Vec<u128>) {
        ensure_initialized(&env);
        require_developer(&env, &developer);
        if keys.len() != values.len() {
            panic!("length mismatch");
        }
        for (key, value) in keys.iter().zip(values.iter()) {
            set_value(&env, &key, value);
            ParameterChanged { key, value }.publish(&env);
        }
    }

    pub fn set_value(env: Env, developer: Address, key: Symbol, value: u128) {
        ensure_initialized(&env);
        require_developer(&env, &developer);
        set_value(&env, &key, value);
        ParameterChanged { key, value }.publish(&env);
    }

    pub fn get_value(env: Env, key: Symbol) -> u128 {
        get_value(&env, &key)
    }

    /// Pool override if present, otherwise the global value.
    pub fn get_pool_value(env: Env, pool: Address, key: Symbol) -> u128 {
        get_pool_override(&env, &pool, &key).unwrap_or_else(|| get_value(&env, &key))
    }

    pub fn set_pool_value(env: Env, caller: Address, pool: Address, key: Symbol, value: u128) {
        ensure_initialized(&env);
        require_pool_writer(&env, &caller);
        set_pool_value(&env, &pool, &key, value);
        PoolParameterChanged { pool, key, value }.publish(&env);
    }

    /// Seed a new pool with the pool-tunable globals and its starting price.
    pub fn init_pool_params(
        env: Env,
        caller: Address,
        pool: Address,
        lend_token: Address,
        collateral_token: Address,
    ) {
        ensure_initialized(&env);
        let factory = optional_address(&env, &DataKey::Factory);
        if factory.as_ref() != Some(&caller) && developer(&env) != caller {
            panic!("config forbidden");
        }
        caller.require_auth();
        for name in POOL_PARAMS {
            let key = Symbol::new(&env, name);
            let value = get_value(&env, &key);
            set_pool_value(&env, &pool, &key, value);
        }
        let lend_price = get_token_price(&env, &lend_token);
        let collateral_price = get_token_price(&env, &collateral_token);
        if lend_price > 0 && collateral_price > 0 {
            let price = collateral_price
                .checked_mul(WAD)
                .expect("math overflow")
                / lend_price;
            set_pool_value(&env, &pool, &Symbol::new(&env, POOL_PRICE), price);
            mark_price_changed(&env, &pool);
            PriceChanged {
                target: pool,
                old_price: 0,
                new_price: price,
            }
            .publish(&env);
        }
    }

    pub fn set_wallets(env: Env, developer: Address, names: Vec<Symbol>, addrs: Vec<Address>) {
        ensure_initialized(&env);
        require_developer(&env, &developer);
        if names.len() != addrs.len() {
            panic!("length mismatch");
        }
        for (name, wallet) in names.iter().zip(addrs.iter()) {
            env.storage()
                .persistent()
                .set(&DataKey::Wallet(name.clone()), &wallet);
            WalletChanged { name, wallet }.publish(&env);
        }
    }

    pub fn wallet(env: Env, name: Symbol) -> Option<Address> {
        wallet(&env, &name)
    }

    /// Price wallet only, subject to the price circuit breaker.
    pub fn set_token_price(env: Env, caller: Address, tokens: Vec<Address>, prices: Vec<u128>) {
        ensure_initialized(&env);
        require_price_wallet(&env, &caller);
        if tokens.len() != prices.len() {
            panic!("length mismatch");
        }
        for (token, price) in tokens.iter().zip(prices.iter()) {
            let old_price = get_token_price(&env, &token);
            check_price_change(&env, &token, old_price, price);
            set_token_price(&env, &token, price);
            mark_price_changed(&env, &token);
            PriceChanged {
                target: token,
                old_price,
                new_price: price,
            }
            .publish(&env);
        }
    }

    /// Price wallet only, subject to the price circuit breaker.
    pub fn set_pool_price(env: Env, caller: Address, pools: Vec<Address>, prices: Vec<u128>) {
        ensure_initialized(&env);
        require_price_wallet(&env, &caller);
        if pools.len() != prices.len() {
            panic!("length mismatch");
        }
        let key = Symbol::new(&env, POOL_PRICE);
        for (pool, price) in pools.iter().zip(prices.iter()) {
            let old_price = get_pool_override(&env, &pool, &key).unwrap_or(0);
            check_price_change(&env, &pool, old_price, price);
            set_pool_value(&env, &pool, &key, price);
            mark_price_changed(&env, &pool);
            PriceChanged {
                target: pool,
                old_price,
                new_price: price,
            }
            .publish(&env);
        }
    }

    pub fn token_price(env: Env, token: Address) -> u128 {
        get_token_price(&env, &token)
    }

    /// Value of `amount` of `from_token` expressed in `to_token`.
    pub fn convert_token_amount(
        env: Env,
        from_token: Address,
        to_token: Address,
        amount: u128,
    ) -> u128 {
        let from_price = get_token_price(&env, &from_token);
        let to_price = get_token_price(&env, &to_token);
        if from_price == 0 || to_price == 0 {
            panic!("price unavailable");
        }
        amount.checked_mul(from_price).expect("math overflow") / to_price
    }

    pub fn developer(env: Env) -> Address {
        ensure_initialized(&env);
        developer(&env)
    }

    pub fn platform(env: Env) -> Address {
        ensure_initialized(&env);
        optional_address(&env, &DataKey::Platform).expect("platform not set")
    }

    pub fn factory(env: Env) -> Address {
        ensure_initialized(&env);
        optional_address(&env, &DataKey::Factory).expect("factory not set")
    }

    pub fn native_token(env: Env) -> Address {
        ensure_initialized(&env);
        optional_address(&env, &DataKey::NativeToken).expect("native token not set")
    }

    pub fn mint(env: Env) -> Option<Address> {
        optional_address(&env, &DataKey::Mint)
    }

    pub fn token(env: Env) -> Option<Address> {
        optional_address(&env, &DataKey::Token)
    }
}

fn require_price_wallet(env: &Env, caller: &Address) {
    let price_wallet = wallet(env, &Symbol::new(env, WALLET_PRICE));
    if price_wallet.as_ref() != Some(caller) {
        panic!("config forbidden");
    }
    caller.require_auth();
}

fn check_price_change(env: &Env, target: &Address, old_price: u128, new_price: u128) {
    if old_price == 0 {
        return;
    }
    let duration = get_value(env, &Symbol::new(env, CHANGE_PRICE_DURATION));
    if let Some(changed_at) = price_changed_at(env, target) {
        let elapsed = env.ledger().sequence().saturating_sub(changed_at) as u128;
        if elapsed < duration {
            panic!("price duration");
        }
    }
    let percent = get_value(env, &Symbol::new(env, CHANGE_PRICE_PERCENT));
    if percent == 0 {
        return;
    }
    let diff = old_price.abs_diff(new_price);
    if diff.saturating_mul(100) > old_price.saturating_mul(percent) {
        panic!("price forbidden");
    }
}
