#![no_std]
use soroban_sdk::{contract, contractimpl, contracttype, token, Address, Env};

const ACC_SCALE: u128 = 1_000_000_000_000_000_000u128;

#[contracttype]
enum DataKey {
    StakingToken,
    RewardToken,
    RewardPerLedger,
    Initialized,
    Paused,
    State,
    User(Address),
}

#[contracttype]
#[derive(Clone, Default)]
struct FarmState {
    acc_reward_per_share: u128,
    last_ledger: u32,
    total_staked: u128,
}

#[contracttype]
#[derive(Clone, Default)]
struct UserInfo {
    amount: u128,
    reward_debt: u128,
}

/// Single-pool masterchef: stakers share `reward_per_ledger` pro rata, paid from the
/// farm's own reward token balance.
#[contract]
pub struct MockFarm;

#[contractimpl]
impl MockFarm {
    pub fn initialize(env: Env, staking_token: Address, reward_token: Address, reward_per_ledger: i128) {
        if env
            .storage()
            .persistent()
            .get::<_, bool>(&DataKey::Initialized)
            .is_some()
        {
            panic!("already initialized");
        }
        if reward_per_ledger < 0 {
            panic!("bad amount");
        }
        let storage = env.storage().persistent();
        storage.set(&DataKey::StakingToken, &staking_token);
        storage.set(&DataKey::RewardToken, &reward_token);
        storage.set(&DataKey::RewardPerLedger, &(reward_per_ledger as u128));
        storage.set(
            &DataKey::State,
            &FarmState {
                last_ledger: env.ledger().sequence(),
                ..FarmState::default()
            },
        );
        storage.set(&DataKey::Initialized, &true);
    }

    /// Test switch: while paused every staking call reverts.
    pub fn set_paused(env: Env, paused: bool) {
        env.storage().persistent().set(&DataKey::Paused, &paused);
    }

    pub fn deposit(env: Env, from: Address, amount: i128) {
        from.require_auth();
        ensure_running(&env);
        if amount <= 0 {
            panic!("bad amount");
        }
        let mut state = update(&env);
        let mut user = user_info(&env, &from);
        pay_pending(&env, &state, &user, &from);
        let farm = env.current_contract_address();
        token::Client::new(&env, &staking_token(&env)).transfer(&from, &farm, &amount);
        user.amount += amount as u128;
        state.total_staked += amount as u128;
        user.reward_debt = user.amount * state.acc_reward_per_share / ACC_SCALE;
        save(&env, &from, &state, &user);
    }

    pub fn withdraw(env: Env, to: Address, amount: i128) {
        to.require_auth();
        ensure_running(&env);
        if amount <= 0 {
            panic!("bad amount");
        }
        let mut state = update(&env);
        let mut user = user_info(&env, &to);
        if user.amount < amount as u128 {
            panic!("insufficient stake");
        }
        pay_pending(&env, &state, &user, &to);
        user.amount -= amount as u128;
        state.total_staked -= amount as u128;
        user.reward_debt = user.amount * state.acc_reward_per_share / ACC_SCALE;
        save(&env, &to, &state, &user);
        token::Client::new(&env, &staking_token(&env)).transfer(
            &env.current_contract_address(),
            &to,
            &amount,
        );
    }

    pub fn harvest(env: Env, to: Address) -> i128 {
        to.require_auth();
        ensure_running(&env);
        let state = update(&env);
        let mut user = user_info(&env, &to);
        let paid = pay_pending(&env, &state, &user, &to);
        user.reward_debt = user.amount * state.acc_reward_per_share / ACC_SCALE;
        save(&env, &to, &state, &user);
        paid
    }

    pub fn staked(env: Env, account: Address) -> i128 {
        user_info(&env, &account).amount as i128
    }

    pub fn pending(env: Env, account: Address) -> i128 {
        let state = project(&env);
        pending_of(&state, &user_info(&env, &account)) as i128
    }
}

fn ensure_running(env: &Env) {
    if env
        .storage()
        .persistent()
        .get::<_, bool>(&DataKey::Paused)
        .unwrap_or(false)
    {
        panic!("farm paused");
    }
}

fn staking_token(env: &Env) -> Address {
    env.storage()
        .persistent()
        .get(&DataKey::StakingToken)
        .expect("staking token not set")
}

fn reward_token(env: &Env) -> Address {
    env.storage()
        .persistent()
        .get(&DataKey::RewardToken)
        .expect("reward token not set")
}

fn user_info(env: &Env, account: &Address) -> UserInfo {
    env.storage()
        .persistent()
        .get(&DataKey::User(account.clone()))
        .unwrap_or_default()
}

fn project(env: &Env) -> FarmState {
    let mut state: FarmState = env
        .storage()
        .persistent()
        .get(&DataKey::State)
        .expect("farm not initialized");
    let now = env.ledger().sequence();
    if now > state.last_ledger {
        if state.total_staked > 0 {
            let per_ledger: u128 = env
                .storage()
                .persistent()
                .get(&DataKey::RewardPerLedger)
                .unwrap_or(0u128);
            let reward = per_ledger * (now - state.last_ledger) as u128;
            state.acc_reward_per_share += reward * ACC_SCALE / state.total_staked;
        }
        state.last_ledger = now;
    }
    state
}

fn update(env: &Env) -> FarmState {
    let state = project(env);
    env.storage().persistent().set(&DataKey::State, &state);
    state
}

fn pending_of(state: &FarmState, user: &UserInfo) -> u128 {
    (user.amount * state.acc_reward_per_share / ACC_SCALE).saturating_sub(user.reward_debt)
}

fn pay_pending(env: &Env, state: &FarmState, user: &UserInfo, to: &Address) -> i128 {
    let pending = pending_of(state, user) as i128;
    if pending == 0 {
        return 0;
    }
    let reward = token::Client::new(env, &reward_token(env));
    let farm = env.current_contract_address();
    let paid = pending.min(reward.balance(&farm));
    if paid > 0 {
        reward.transfer(&farm, to, &paid);
    }
    paid
}

fn save(env: &Env, account: &Address, state: &FarmState, user: &UserInfo) {
    env.storage().persistent().set(&DataKey::State, state);
    env.storage()
        .persistent()
        .set(&DataKey::User(account.clone()), user);
}
