#![no_std]

use soroban_sdk::{
    contract, contractevent, contractimpl, contracttype, Address, BytesN, Env, String,
};

#[soroban_sdk::contractclient(name = "ConfigClient")]
pub trait ConfigContract {
    fn developer(env: Env) -> Address;
    fn platform(env: Env) -> Address;
    fn init_pool_params(
        env: Env,
        caller: Address,
        pool: Address,
        lend_token: Address,
        collateral_token: Address,
    );
}

#[soroban_sdk::contractclient(name = "PoolClient")]
pub trait PoolContract {
    fn initialize(
        env: Env,
        factory: Address,
        platform: Address,
        config: Address,
        lend_token: Address,
        collateral_token: Address,
    );
}

#[contract]
pub struct PairlendFactory;

#[contracttype]
pub enum DataKey {
    Initialized,
    Config,
    PoolWasmHash,
    Pair(Address, Address),
    IsPool(Address),
    PoolAt(u32),
    PoolCount,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolCreated {
    #[topic]
    pub lend_token: Address,
    #[topic]
    pub collateral_token: Address,
    pub pool: Address,
    pub index: u32,
}

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

#[contractimpl]
impl PairlendFactory {
    /// Bind the factory to the registry. Only the registry's developer may do this.
    pub fn initialize(env: Env, developer: Address, config: Address) {
        if env.storage().instance().has(&DataKey::Initialized) {
            panic!("already initialized");
        }
        if let Some(expected) = option_env!("PAIRLEND_INIT_DEVELOPER") {
            let expected = Address::from_string(&String::from_str(&env, expected));
            if developer != expected {
                panic!("unexpected developer");
            }
        }
        if ConfigClient::new(&env, &config).developer() != developer {
            panic!("not admin");
        }
        developer.require_auth();
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage()
            .instance()
            .set(&DataKey::Initialized, &true);
        bump_ttl(&env);
    }

    /// Index an already deployed, uninitialized pool contract for the pair.
    pub fn create_pool(
        env: Env,
        developer: Address,
        lend_token: Address,
        collateral_token: Address,
        pool: Address,
    ) -> Address {
        bump_ttl(&env);
        require_developer(&env, &developer);
        register_pool(&env, lend_token, collateral_token, pool)
    }

    pub fn set_pool_wasm_hash(env: Env, developer: Address, hash: BytesN<32>) {
        bump_ttl(&env);
        require_developer(&env, &developer);
        env.storage().instance().set(&DataKey::PoolWasmHash, &hash);
    }

    /// Deploy a fresh pool from the stored wasm hash and index it.
    pub fn deploy_pool(
        env: Env,
        developer: Address,
        lend_token: Address,
        collateral_token: Address,
        salt: BytesN<32>,
    ) -> Address {
        bump_ttl(&env);
        require_developer(&env, &developer);
        if pair(&env, &lend_token, &collateral_token).is_some() {
            panic!("pool exists");
        }
        let wasm_hash: BytesN<32> = env
            .storage()
            .instance()
            .get(&DataKey::PoolWasmHash)
            .expect("wasm hash not set");
        let pool = env
            .deployer()
            .with_current_contract(salt)
            .deploy_v2(wasm_hash, ());
        register_pool(&env, lend_token, collateral_token, pool)
    }

    pub fn get_pool(env: Env, lend_token: Address, collateral_token: Address) -> Option<Address> {
        bump_ttl(&env);
        pair(&env, &lend_token, &collateral_token)
    }

    pub fn is_pool(env: Env, pool: Address) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::IsPool(pool))
            .unwrap_or(false)
    }

    pub fn all_pools_length(env: Env) -> u32 {
        pool_count(&env)
    }

    pub fn all_pools(env: Env, index: u32) -> Address {
        match env.storage().persistent().get(&DataKey::PoolAt(index)) {
            Some(pool) => pool,
            None => panic!("pool not found"),
        }
    }

    pub fn config(env: Env) -> Address {
        config(&env)
    }
}

fn register_pool(env: &Env, lend_token: Address, collateral_token: Address, pool: Address) -> Address {
    if pair(env, &lend_token, &collateral_token).is_some() {
        panic!("pool exists");
    }
    let config_id = config(env);
    let registry = ConfigClient::new(env, &config_id);
    let factory = env.current_contract_address();
    PoolClient::new(env, &pool).initialize(
        &factory,
        &registry.platform(),
        &config_id,
        &lend_token,
        &collateral_token,
    );
    registry.init_pool_params(&factory, &pool, &lend_token, &collateral_token);

    let index = pool_count(env);
    let persistent = env.storage().persistent();
    let pair_key = DataKey::Pair(lend_token.clone(), collateral_token.clone());
    let is_pool_key = DataKey::IsPool(pool.clone());
    let index_key = DataKey::PoolAt(index);
    persistent.set(&pair_key, &pool);
    persistent.set(&is_pool_key, &true);
    persistent.set(&index_key, &pool);
    persistent.set(&DataKey::PoolCount, &(index + 1));
    for key in [pair_key, is_pool_key, index_key, DataKey::PoolCount] {
        persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    PoolCreated {
        lend_token,
        collateral_token,
        pool: pool.clone(),
        index,
    }
    .publish(env);
    pool
}

fn pair(env: &Env, lend_token: &Address, collateral_token: &Address) -> Option<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Pair(lend_token.clone(), collateral_token.clone()))
}

fn pool_count(env: &Env) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::PoolCount)
        .unwrap_or(0u32)
}

fn config(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .expect("not initialized")
}

fn require_developer(env: &Env, developer: &Address) {
    let stored = ConfigClient::new(env, &config(env)).developer();
    if stored != *developer {
        panic!("not admin");
    }
    developer.require_auth();
}

fn bump_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

#[cfg(test)]
mod test;
