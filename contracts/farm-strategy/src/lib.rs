#![no_std]
use soroban_sdk::auth::{ContractContext, InvokerContractAuthEntry, SubContractInvocation};
use soroban_sdk::{
    contract, contractevent, contractimpl, contracttype, token, Address, Env, IntoVal, String,
    Symbol, Vec,
};

const ACC_SCALE: u128 = 1_000_000_000_000_000_000u128;
const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

#[soroban_sdk::contractclient(name = "FarmClient")]
pub trait Farm {
    fn deposit(env: Env, from: Address, amount: i128);
    fn withdraw(env: Env, to: Address, amount: i128);
    fn harvest(env: Env, to: Address) -> i128;
    fn pending(env: Env, account: Address) -> i128;
}

#[contracttype]
pub enum DataKey {
    Initialized,
    Developer,
    Pool,
    CollateralToken,
    RewardToken,
    Farm,
    Active,
    State,
    User(Address),
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StrategyState {
    pub acc_reward_per_share: u128,
    pub total_productivity: u128,
    pub liquidated_stake: u128,
    /// Harvested while nobody held productivity; folded into the next distribution.
    pub unallocated: u128,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserReward {
    pub productivity: u128,
    pub reward_debt: u128,
    pub reward_earn: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invested {
    #[topic]
    pub user: Address,
    pub amount: u128,
    pub productivity: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Divested {
    #[topic]
    pub user: Address,
    #[topic]
    pub to: Address,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeLiquidated {
    #[topic]
    pub user: Address,
    pub amount: u128,
    pub liquidated_stake: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Harvested {
    pub amount: u128,
    pub acc_reward_per_share: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPaid {
    #[topic]
    pub user: Address,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Migrated {
    #[topic]
    pub pool: Address,
    pub positions: u32,
    pub collateral: u128,
}

/// Rewards nobody held productivity for when the strategy exited.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnallocatedSwept {
    #[topic]
    pub to: Address,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategyExited {
    #[topic]
    pub pool: Address,
    pub collateral: u128,
}

/// Stakes a pool's collateral in a masterchef-style farm and shares the farm rewards
/// among borrowers pro rata of their pledged collateral.
#[contract]
pub struct FarmStrategy;

#[contractimpl]
impl FarmStrategy {
    pub fn initialize(
        env: Env,
        developer: Address,
        reward_token: Address,
        collateral_token: Address,
        pool: Address,
        farm: Address,
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
        if reward_token == collateral_token {
            panic!("invalid reward token");
        }
        let storage = env.storage().persistent();
        storage.set(&DataKey::Developer, &developer);
        storage.set(&DataKey::RewardToken, &reward_token);
        storage.set(&DataKey::CollateralToken, &collateral_token);
        storage.set(&DataKey::Pool, &pool);
        storage.set(&DataKey::Farm, &farm);
        storage.set(&DataKey::Active, &true);
        storage.set(&DataKey::State, &StrategyState::default());
        env.storage().instance().set(&DataKey::Initialized, &true);
        bump_critical_ttl(&env);
    }

    /// Stake collateral the pool already transferred here and credit it to `user`.
    pub fn invest(env: Env, user: Address, amount: u128) {
        require_pool(&env);
        require_active(&env);
        if amount == 0 {
            panic!("invalid amount");
        }
        let mut state = load_state(&env);
        stake(&env, &mut state, amount);
        let mut reward = load_user(&env, &user);
        settle(&state, &mut reward);
        reward.productivity += amount;
        state.total_productivity += amount;
        checkpoint(&state, &mut reward);
        save_user(&env, &user, &reward);
        save_state(&env, &state);
        Invested {
            user,
            amount,
            productivity: reward.productivity,
        }
        .publish(&env);
    }

    /// Unstake `amount` of the user's collateral and send it to `to`.
    pub fn withdraw(env: Env, user: Address, amount: u128, to: Address) {
        require_pool(&env);
        require_active(&env);
        let mut state = load_state(&env);
        let mut reward = load_user(&env, &user);
        if amount == 0 || amount > reward.productivity {
            panic!("insufficient productivity");
        }
        unstake(&env, &mut state, amount);
        settle(&state, &mut reward);
        reward.productivity -= amount;
        state.total_productivity -= amount;
        checkpoint(&state, &mut reward);
        save_user(&env, &user, &reward);
        save_state(&env, &state);
        token::Client::new(&env, &collateral_token(&env)).transfer(
            &env.current_contract_address(),
            &to,
            &to_i128(amount),
        );
        Divested { user, to, amount }.publish(&env);
    }

    /// Move the user's stake into the liquidated bucket. Rewards already earned stay theirs.
    pub fn liquidation(env: Env, user: Address) {
        require_pool(&env);
        require_active(&env);
        let mut state = load_state(&env);
        harvest(&env, &mut state);
        let mut reward = load_user(&env, &user);
        settle(&state, &mut reward);
        let moved = reward.productivity;
        reward.productivity = 0;
        state.total_productivity -= moved;
        state.liquidated_stake += moved;
        checkpoint(&state, &mut reward);
        save_user(&env, &user, &reward);
        save_state(&env, &state);
        StakeLiquidated {
            user,
            amount: moved,
            liquidated_stake: state.liquidated_stake,
        }
        .publish(&env);
    }

    /// Unstake liquidated collateral to a supplier.
    pub fn release(env: Env, amount: u128, to: Address) {
        require_pool(&env);
        require_active(&env);
        let mut state = load_state(&env);
        if amount == 0 || amount > state.liquidated_stake {
            panic!("insufficient liquidated stake");
        }
        unstake(&env, &mut state, amount);
        state.liquidated_stake -= amount;
        save_state(&env, &state);
        token::Client::new(&env, &collateral_token(&env)).transfer(
            &env.current_contract_address(),
            &to,
            &to_i128(amount),
        );
        Divested {
            user: pool(&env),
            to,
            amount,
        }
        .publish(&env);
    }

    /// Harvest, unstake everything and hand the collateral back to the pool.
    /// Productivity is frozen so users can still `mint` what they earned.
    pub fn exit(env: Env) -> u128 {
        let pool = require_pool(&env);
        require_active(&env);
        let mut state = load_state(&env);
        let total = state.total_productivity + state.liquidated_stake;
        if total > 0 {
            unstake(&env, &mut state, total);
        } else {
            harvest(&env, &mut state);
        }
        state.liquidated_stake = 0;
        // no holder left to earn what is unallocated
        let swept = state.unallocated;
        state.unallocated = 0;
        save_state(&env, &state);
        env.storage().persistent().set(&DataKey::Active, &false);
        if total > 0 {
            token::Client::new(&env, &collateral_token(&env)).transfer(
                &env.current_contract_address(),
                &pool,
                &to_i128(total),
            );
        }
        if swept > 0 {
            let to = developer(&env);
            token::Client::new(&env, &reward_token(&env)).transfer(
                &env.current_contract_address(),
                &to,
                &to_i128(swept),
            );
            UnallocatedSwept { to, amount: swept }.publish(&env);
        }
        StrategyExited {
            pool,
            collateral: total,
        }
        .publish(&env);
        total
    }

    /// Take over positions from a previous strategy. The pool transfers the collateral first.
    pub fn migrate(env: Env, positions: Vec<(Address, u128)>, liquidated: u128) {
        let pool = require_pool(&env);
        require_active(&env);
        let mut state = load_state(&env);
        if state.total_productivity > 0 || state.liquidated_stake > 0 {
            panic!("already migrated");
        }
        let mut total = liquidated;
        for (_, amount) in positions.iter() {
            total += amount;
        }
        if total > 0 {
            stake(&env, &mut state, total);
        }
        for (user, amount) in positions.iter() {
            let mut reward = load_user(&env, &user);
            settle(&state, &mut reward);
            reward.productivity += amount;
            checkpoint(&state, &mut reward);
            save_user(&env, &user, &reward);
            state.total_productivity += amount;
        }
        state.liquidated_stake = liquidated;
        save_state(&env, &state);
        Migrated {
            pool,
            positions: positions.len(),
            collateral: total,
        }
        .publish(&env);
    }

    /// Pay the user's farm rewards.
    pub fn mint(env: Env, user: Address) -> u128 {
        user.require_auth();
        bump_critical_ttl(&env);
        let mut state = load_state(&env);
        if is_active(&env) {
            harvest(&env, &mut state);
        }
        let mut reward = load_user(&env, &user);
        settle(&state, &mut reward);
        let amount = reward.reward_earn;
        reward.reward_earn = 0;
        checkpoint(&state, &mut reward);
        save_user(&env, &user, &reward);
        save_state(&env, &state);
        if amount > 0 {
            token::Client::new(&env, &reward_token(&env)).transfer(
                &env.current_contract_address(),
                &user,
                &to_i128(amount),
            );
        }
        RewardPaid {
            user,
            amount,
        }
        .publish(&env);
        amount
    }

    /// Rewards `mint` would pay now, including what the farm holds for this strategy.
    pub fn pending(env: Env, user: Address) -> u128 {
        let mut state = load_state(&env);
        if is_active(&env) && state.total_productivity > 0 {
            let farm_pending = FarmClient::new(&env, &farm(&env))
                .pending(&env.current_contract_address())
                .max(0) as u128;
            state.acc_reward_per_share +=
                (farm_pending + state.unallocated) * ACC_SCALE / state.total_productivity;
        }
        let mut reward = load_user(&env, &user);
        settle(&state, &mut reward);
        reward.reward_earn
    }

    pub fn productivity(env: Env, user: Address) -> u128 {
        load_user(&env, &user).productivity
    }

    pub fn total_productivity(env: Env) -> u128 {
        load_state(&env).total_productivity
    }

    pub fn liquidated_stake(env: Env) -> u128 {
        load_state(&env).liquidated_stake
    }

    pub fn is_active(env: Env) -> bool {
        is_active(&env)
    }

    pub fn pool(env: Env) -> Address {
        pool(&env)
    }

    pub fn developer(env: Env) -> Address {
        developer(&env)
    }

    pub fn collateral_token(env: Env) -> Address {
        collateral_token(&env)
    }

    pub fn reward_token(env: Env) -> Address {
        reward_token(&env)
    }

    pub fn farm(env: Env) -> Address {
        farm(&env)
    }

    pub fn bump_ttl(env: Env) {
        bump_critical_ttl(&env);
    }
}

fn read_address(env: &Env, key: &DataKey, missing: &str) -> Address {
    match env.storage().persistent().get(key) {
        Some(addr) => addr,
        None => panic!("{}", missing),
    }
}

fn developer(env: &Env) -> Address {
    read_address(env, &DataKey::Developer, "developer not set")
}

fn pool(env: &Env) -> Address {
    read_address(env, &DataKey::Pool, "pool not set")
}

fn collateral_token(env: &Env) -> Address {
    read_address(env, &DataKey::CollateralToken, "collateral token not set")
}

fn reward_token(env: &Env) -> Address {
    read_address(env, &DataKey::RewardToken, "reward token not set")
}

fn farm(env: &Env) -> Address {
    read_address(env, &DataKey::Farm, "farm not set")
}

fn require_pool(env: &Env) -> Address {
    bump_critical_ttl(env);
    let pool = pool(env);
    pool.require_auth();
    pool
}

fn is_active(env: &Env) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Active)
        .unwrap_or(false)
}

fn require_active(env: &Env) {
    if !is_active(env) {
        panic!("strategy inactive");
    }
}

fn load_state(env: &Env) -> StrategyState {
    env.storage()
        .persistent()
        .get(&DataKey::State)
        .unwrap_or_default()
}

fn save_state(env: &Env, state: &StrategyState) {
    env.storage().persistent().set(&DataKey::State, state);
}

fn load_user(env: &Env, user: &Address) -> UserReward {
    env.storage()
        .persistent()
        .get(&DataKey::User(user.clone()))
        .unwrap_or_default()
}

fn save_user(env: &Env, user: &Address, reward: &UserReward) {
    let key = DataKey::User(user.clone());
    env.storage().persistent().set(&key, reward);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn settle(state: &StrategyState, reward: &mut UserReward) {
    reward.reward_earn += (reward.productivity * state.acc_reward_per_share / ACC_SCALE)
        .saturating_sub(reward.reward_debt);
}

fn checkpoint(state: &StrategyState, reward: &mut UserReward) {
    reward.reward_debt = reward.productivity * state.acc_reward_per_share / ACC_SCALE;
}

/// Credit reward tokens that arrived during a farm call to the current holders.
fn distribute(env: &Env, state: &mut StrategyState, gained: u128) {
    let amount = gained + state.unallocated;
    if amount == 0 {
        return;
    }
    if state.total_productivity == 0 {
        state.unallocated = amount;
        return;
    }
    state.unallocated = 0;
    state.acc_reward_per_share += amount * ACC_SCALE / state.total_productivity;
    Harvested {
        amount,
        acc_reward_per_share: state.acc_reward_per_share,
    }
    .publish(env);
}

fn reward_balance(env: &Env) -> u128 {
    token::Client::new(env, &reward_token(env))
        .balance(&env.current_contract_address())
        .max(0) as u128
}

fn harvest(env: &Env, state: &mut StrategyState) {
    let before = reward_balance(env);
    FarmClient::new(env, &farm(env)).harvest(&env.current_contract_address());
    let gained = reward_balance(env).saturating_sub(before);
    distribute(env, state, gained);
}

fn stake(env: &Env, state: &mut StrategyState, amount: u128) {
    let farm = farm(env);
    let this = env.current_contract_address();
    let before = reward_balance(env);
    authorize_transfer(env, &collateral_token(env), &this, &farm, to_i128(amount));
    FarmClient::new(env, &farm).deposit(&this, &to_i128(amount));
    let gained = reward_balance(env).saturating_sub(before);
    distribute(env, state, gained);
}

fn unstake(env: &Env, state: &mut StrategyState, amount: u128) {
    let before = reward_balance(env);
    FarmClient::new(env, &farm(env)).withdraw(&env.current_contract_address(), &to_i128(amount));
    let gained = reward_balance(env).saturating_sub(before);
    distribute(env, state, gained);
}

/// The farm pulls the stake with `transfer(strategy, farm, amount)`.
fn authorize_transfer(env: &Env, token: &Address, from: &Address, to: &Address, amount: i128) {
    let args = (from.clone(), to.clone(), amount).into_val(env);
    let ctx = ContractContext {
        contract: token.clone(),
        fn_name: Symbol::new(env, "transfer"),
        args,
    };
    let mut auths = Vec::new(env);
    auths.push_back(InvokerContractAuthEntry::Contract(SubContractInvocation {
        context: ctx,
        sub_invocations: Vec::new(env),
    }));
    env.authorize_as_current_contract(auths);
}

fn to_i128(amount: u128) -> i128 {
    if amount > i128::MAX as u128 {
        panic!("amount exceeds i128");
    }
    amount as i128
}

fn bump_critical_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    for key in [
        DataKey::Developer,
        DataKey::Pool,
        DataKey::CollateralToken,
        DataKey::RewardToken,
        DataKey::Farm,
        DataKey::Active,
        DataKey::State,
    ] {
        if persistent.has(&key) {
            persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
    }
    if env.storage().instance().has(&DataKey::Initialized) {
        env.storage()
            .instance()
            .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

#[cfg(test)]
mod test;
