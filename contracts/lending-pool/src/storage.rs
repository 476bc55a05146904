use soroban_sdk::{contracttype, Address, Env, Symbol, Vec};

#[soroban_sdk::contractclient(name = "ConfigClient")]
pub trait ConfigContract {
    fn developer(env: Env) -> Address;
    fn get_pool_value(env: Env, pool: Address, key: Symbol) -> u128;
    fn wallet(env: Env, name: Symbol) -> Option<Address>;
    fn mint(env: Env) -> Option<Address>;
}

#[soroban_sdk::contractclient(name = "StrategyClient")]
pub trait StrategyContract {
    fn pool(env: Env) -> Address;
    fn developer(env: Env) -> Address;
    fn collateral_token(env: Env) -> Address;
    fn invest(env: Env, user: Address, amount: u128);
    fn withdraw(env: Env, user: Address, amount: u128, to: Address);
    fn liquidation(env: Env, user: Address);
    fn release(env: Env, amount: u128, to: Address);
    fn exit(env: Env) -> u128;
    fn migrate(env: Env, positions: Vec<(Address, u128)>, liquidated: u128);
}

#[contracttype]
pub enum DataKey {
    Initialized,
    Factory,
    Platform,
    Config,
    LendToken,
    CollateralToken,
    Strategy,
    State,
    Supply(Address),
    Borrow(Address),
    BorrowerAt(u32),
    BorrowerCount,
    LiquidationHistory(Address),
    UnclaimedCollateral(Address),
    TotalUnclaimed,
}

/// Pool-wide accounting. Accumulators are WAD scaled.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolState {
    pub total_borrow: u128,
    pub total_pledge: u128,
    pub remain_supply: u128,
    /// Sum of every supplier's `amount_supply`.
    pub total_supply: u128,
    pub interest_per_supply: u128,
    pub interest_per_borrow: u128,
    pub liquidation_per_supply: u128,
    pub total_liquidation: u128,
    pub total_liq_supply_amount: u128,
    pub last_interest_update: u32,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Supply {
    pub amount_supply: u128,
    pub interest_settled: u128,
    pub liquidation_settled: u128,
    pub interests: u128,
    pub liquidation: u128,
}

/// `index` is the slot in the open-borrower list while `amount_collateral > 0`.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Borrow {
    pub index: u32,
    pub amount_collateral: u128,
    pub interest_settled: u128,
    pub amount_borrow: u128,
    pub interests: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiquidationRecord {
    pub user: Address,
    pub liquidator: Address,
    pub amount_collateral: u128,
    pub liquidation_amount: u128,
    pub ledger: u32,
}

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

pub fn ensure_initialized(env: &Env) {
    if !env.storage().instance().has(&DataKey::Initialized) {
        panic!("pool not initialized");
    }
    bump_core_ttl(env);
}

pub fn bump_core_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    let persistent = env.storage().persistent();
    for key in [
        DataKey::Factory,
        DataKey::Platform,
        DataKey::Config,
        DataKey::LendToken,
        DataKey::CollateralToken,
        DataKey::State,
        DataKey::BorrowerCount,
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

fn address(env: &Env, key: &DataKey, missing: &str) -> Address {
    match env.storage().persistent().get(key) {
        Some(addr) => addr,
        None => panic!("{}", missing),
    }
}

pub fn platform(env: &Env) -> Address {
    address(env, &DataKey::Platform, "platform not set")
}

pub fn require_platform(env: &Env) {
    platform(env).require_auth();
}

pub fn config(env: &Env) -> ConfigClient<'_> {
    ConfigClient::new(env, &address(env, &DataKey::Config, "config not set"))
}

pub fn lend_token(env: &Env) -> Address {
    address(env, &DataKey::LendToken, "lend token not set")
}

pub fn collateral_token(env: &Env) -> Address {
    address(env, &DataKey::CollateralToken, "collateral token not set")
}

pub fn strategy(env: &Env) -> Option<Address> {
    env.storage().persistent().get(&DataKey::Strategy)
}

pub fn set_strategy(env: &Env, strategy: &Option<Address>) {
    match strategy {
        Some(addr) => {
            env.storage().persistent().set(&DataKey::Strategy, addr);
            bump_key(env, &DataKey::Strategy);
        }
        None => env.storage().persistent().remove(&DataKey::Strategy),
    }
}

pub fn load_state(env: &Env) -> PoolState {
    env.storage()
        .persistent()
        .get(&DataKey::State)
        .unwrap_or_default()
}

pub fn save_state(env: &Env, state: &PoolState) {
    env.storage().persistent().set(&DataKey::State, state);
    bump_key(env, &DataKey::State);
}

pub fn load_supply(env: &Env, user: &Address) -> Supply {
    let key = DataKey::Supply(user.clone());
    bump_key(env, &key);
    env.storage().persistent().get(&key).unwrap_or_default()
}

pub fn save_supply(env: &Env, user: &Address, supply: &Supply) {
    let key = DataKey::Supply(user.clone());
    env.storage().persistent().set(&key, supply);
    bump_key(env, &key);
}

pub fn load_borrow(env: &Env, user: &Address) -> Option<Borrow> {
    let key = DataKey::Borrow(user.clone());
    bump_key(env, &key);
    env.storage().persistent().get(&key)
}

pub fn save_borrow(env: &Env, user: &Address, borrow: &Borrow) {
    let key = DataKey::Borrow(user.clone());
    env.storage().persistent().set(&key, borrow);
    bump_key(env, &key);
}

pub fn borrower_count(env: &Env) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::BorrowerCount)
        .unwrap_or(0u32)
}

pub fn borrower_at(env: &Env, index: u32) -> Option<Address> {
    let key = DataKey::BorrowerAt(index);
    bump_key(env, &key);
    env.storage().persistent().get(&key)
}

fn set_borrower_count(env: &Env, count: u32) {
    env.storage()
        .persistent()
        .set(&DataKey::BorrowerCount, &count);
    bump_key(env, &DataKey::BorrowerCount);
}

/// Appends `user` to the open-borrower list and returns its slot.
pub fn push_borrower(env: &Env, user: &Address) -> u32 {
    let index = borrower_count(env);
    let key = DataKey::BorrowerAt(index);
    env.storage().persistent().set(&key, user);
    bump_key(env, &key);
    set_borrower_count(env, index + 1);
    index
}

/// Frees slot `index` by moving the last borrower into it. Returns the moved borrower.
pub fn remove_borrower(env: &Env, index: u32) -> Option<Address> {
    let count = borrower_count(env);
    if index >= count {
        panic!("borrower not found");
    }
    let last = count - 1;
    let last_key = DataKey::BorrowerAt(last);
    let moved = if index != last {
        let addr: Address = env
            .storage()
            .persistent()
            .get(&last_key)
            .expect("borrower not set");
        let key = DataKey::BorrowerAt(index);
        env.storage().persistent().set(&key, &addr);
        bump_key(env, &key);
        Some(addr)
    } else {
        None
    };
    env.storage().persistent().remove(&last_key);
    set_borrower_count(env, last);
    moved
}

pub fn liquidation_history(env: &Env, user: &Address) -> Vec<LiquidationRecord> {
    let key = DataKey::LiquidationHistory(user.clone());
    bump_key(env, &key);
    env.storage()
        .persistent()
        .get(&key)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn push_liquidation(env: &Env, record: LiquidationRecord) {
    let key = DataKey::LiquidationHistory(record.user.clone());
    let mut history = liquidation_history(env, &record.user);
    history.push_back(record);
    env.storage().persistent().set(&key, &history);
    bump_key(env, &key);
}

pub fn unclaimed_collateral(env: &Env, user: &Address) -> u128 {
    env.storage()
        .persistent()
        .get(&DataKey::UnclaimedCollateral(user.clone()))
        .unwrap_or(0u128)
}

pub fn total_unclaimed(env: &Env) -> u128 {
    env.storage()
        .persistent()
        .get(&DataKey::TotalUnclaimed)
        .unwrap_or(0u128)
}

pub fn set_unclaimed_collateral(env: &Env, user: &Address, amount: u128) {
    let key = DataKey::UnclaimedCollateral(user.clone());
    let before = unclaimed_collateral(env, user);
    let total = total_unclaimed(env)
        .saturating_sub(before)
        .saturating_add(amount);
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
        bump_key(env, &key);
    }
    env.storage().persistent().set(&DataKey::TotalUnclaimed, &total);
}
