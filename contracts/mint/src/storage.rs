use soroban_sdk::{contracttype, Address, Env, Symbol};

pub const WAD: u128 = 1_000_000_000_000_000_000u128;
pub const BPS: u128 = 10_000;

pub const POOL_MINT_POWER: &str = "POOL_MINT_POWER";
pub const MINT_AMOUNT_PER_BLOCK: &str = "MINT_AMOUNT_PER_BLOCK";
pub const MINT_BORROW_PERCENT: &str = "MINT_BORROW_PERCENT";
pub const MINT_TEAM_SHARE: &str = "MINT_TEAM_SHARE";
pub const MINT_SPARE_SHARE: &str = "MINT_SPARE_SHARE";
pub const WALLET_TEAM: &str = "team";
pub const WALLET_SPARE: &str = "spare";

#[soroban_sdk::contractclient(name = "ConfigClient")]
pub trait ConfigContract {
    fn developer(env: Env) -> Address;
    fn factory(env: Env) -> Address;
    fn token(env: Env) -> Option<Address>;
    fn get_value(env: Env, key: Symbol) -> u128;
    fn get_pool_value(env: Env, pool: Address, key: Symbol) -> u128;
    fn wallet(env: Env, name: Symbol) -> Option<Address>;
}

#[soroban_sdk::contractclient(name = "FactoryClient")]
pub trait FactoryContract {
    fn is_pool(env: Env, pool: Address) -> bool;
}

#[contracttype]
pub enum DataKey {
    Initialized,
    Config,
    State,
    Lend(Address, Address),
    Borrow(Address, Address),
}

/// Emission schedule and both reward accumulators (`WAD` scaled per unit of productivity).
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MintState {
    pub amount_per_block: u128,
    pub borrow_percent: u128,
    pub remaining: u128,
    pub acc_lend_per_share: u128,
    pub acc_borrow_per_share: u128,
    pub total_lend_productivity: u128,
    pub total_borrow_productivity: u128,
    pub last_ledger: u32,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Position {
    pub productivity: u128,
    pub reward_debt: u128,
    pub reward_earn: u128,
}

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

pub fn ensure_initialized(env: &Env) {
    if !env.storage().instance().has(&DataKey::Initialized) {
        panic!("not initialized");
    }
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    for key in [DataKey::Config, DataKey::State] {
        bump_key(env, &key);
    }
}

fn bump_key(env: &Env, key: &DataKey) {
    let persistent = env.storage().persistent();
    if persistent.has(key) {
        persistent.extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

pub fn config(env: &Env) -> ConfigClient<'_> {
    let id: Address = env
        .storage()
        .persistent()
        .get(&DataKey::Config)
        .expect("config not set");
    ConfigClient::new(env, &id)
}

pub fn load_state(env: &Env) -> MintState {
    env.storage()
        .persistent()
        .get(&DataKey::State)
        .unwrap_or_default()
}

pub fn save_state(env: &Env, state: &MintState) {
    env.storage().persistent().set(&DataKey::State, state);
    bump_key(env, &DataKey::State);
}

fn position_key(pool: &Address, user: &Address, borrow_side: bool) -> DataKey {
    if borrow_side {
        DataKey::Borrow(pool.clone(), user.clone())
    } else {
        DataKey::Lend(pool.clone(), user.clone())
    }
}

pub fn load_position(env: &Env, pool: &Address, user: &Address, borrow_side: bool) -> Position {
    let key = position_key(pool, user, borrow_side);
    bump_key(env, &key);
    env.storage().persistent().get(&key).unwrap_or_default()
}

pub fn save_position(env: &Env, pool: &Address, user: &Address, borrow_side: bool, position: &Position) {
    let key = position_key(pool, user, borrow_side);
    env.storage().persistent().set(&key, position);
    bump_key(env, &key);
}
