use soroban_sdk::{contract, contractimpl, token, Address, Env, Symbol, Vec};

use crate::constants::*;
use crate::events::*;
use crate::helpers::*;
use crate::storage::*;

#[contract]
pub struct LendingPool;

#[contractimpl]
impl LendingPool {
    /// Bind the pool to its pair. Called once by the factory.
    pub fn initialize(
        env: Env,
        factory: Address,
        platform: Address,
        config: Address,
        lend_token: Address,
        collateral_token: Address,
    ) {
        if env.storage().instance().has(&DataKey::Initialized) {
            panic!("already initialized");
        }
        factory.require_auth();
        let storage = env.storage().persistent();
        storage.set(&DataKey::Factory, &factory);
        storage.set(&DataKey::Platform, &platform);
        storage.set(&DataKey::Config, &config);
        storage.set(&DataKey::LendToken, &lend_token);
        storage.set(&DataKey::CollateralToken, &collateral_token);
        let state = PoolState {
            last_interest_update: env.ledger().sequence(),
            ..PoolState::default()
        };
        save_state(&env, &state);
        env.storage().instance().set(&DataKey::Initialized, &true);
        bump_core_ttl(&env);
    }

    pub fn deposit(env: Env, user: Address, amount: u128) {
        ensure_initialized(&env);
        require_platform(&env);
        user.require_auth();
        if amount == 0 {
            panic!("invalid amount");
        }
        let mut state = load_state(&env);
        update_interests(&env, &mut state);
        let mut supply = load_supply(&env, &user);
        settle_supply(&state, &mut supply);

        token::Client::new(&env, &lend_token(&env)).transfer(
            &user,
            &env.current_contract_address(),
            &to_i128(amount),
        );

        supply.amount_supply += amount;
        state.remain_supply += amount;
        state.total_supply += amount;
        checkpoint_supply(&state, &mut supply);
        save_supply(&env, &user, &supply);
        save_state(&env, &state);

        Deposit {
            user: user.clone(),
            amount,
            amount_supply: supply.amount_supply,
            remain_supply: state.remain_supply,
        }
        .publish(&env);
        notify_mint(&env, "update_lend", &user, supply.amount_supply);
    }

    /// Withdraw `amount` of principal together with the matching share of interest and
    /// liquidated collateral. Returns `(lend_paid, collateral_paid)`.
    pub fn withdraw(env: Env, user: Address, amount: u128) -> (u128, u128) {
        ensure_initialized(&env);
        require_platform(&env);
        user.require_auth();
        if amount == 0 {
            panic!("invalid amount");
        }
        let mut state = load_state(&env);
        update_interests(&env, &mut state);
        let mut supply = load_supply(&env, &user);
        settle_supply(&state, &mut supply);
        if amount > supply.amount_supply {
            panic!("not enough balance");
        }

        let withdraw_interest = mul_div(supply.interests, amount, supply.amount_supply);
        let withdraw_liquidation = mul_div(supply.liquidation, amount, supply.amount_supply);
        let withdraw_liquidation_supply_amount = if state.total_liquidation > 0 {
            mul_div(
                withdraw_liquidation,
                state.total_liq_supply_amount,
                state.total_liquidation,
            )
        } else {
            0
        };

        // Lend tokens leaving the pool: principal plus interest, minus what the
        // liquidated collateral already stands for.
        let lend_out =
            (amount + withdraw_interest).saturating_sub(withdraw_liquidation_supply_amount);
        if lend_out > state.remain_supply {
            panic!("not enough pool balance");
        }
        let share_rate = pool_value(&env, INTEREST_PLATFORM_SHARE);
        let platform_share = mul_div(withdraw_interest, share_rate, WAD).min(lend_out);
        let lend_paid = lend_out - platform_share;

        state.remain_supply -= lend_out;
        state.total_liquidation = state.total_liquidation.saturating_sub(withdraw_liquidation);
        state.total_liq_supply_amount = state
            .total_liq_supply_amount
            .saturating_sub(withdraw_liquidation_supply_amount);
        state.total_pledge = state.total_pledge.saturating_sub(withdraw_liquidation);
        supply.interests -= withdraw_interest;
        supply.liquidation -= withdraw_liquidation;
        supply.amount_supply -= amount;
        state.total_supply -= amount;
        checkpoint_supply(&state, &mut supply);
        save_supply(&env, &user, &supply);
        save_state(&env, &state);

        pay_platform_share(&env, platform_share);
        if lend_paid > 0 {
            token::Client::new(&env, &lend_token(&env)).transfer(
                &env.current_contract_address(),
                &user,
                &to_i128(lend_paid),
            );
        }
        if withdraw_liquidation > 0 {
            release_liquidated_collateral(&env, &user, withdraw_liquidation);
        }

        Withdraw {
            user: user.clone(),
            amount,
            lend_paid,
            collateral_paid: withdraw_liquidation,
            platform_share,
        }
        .publish(&env);
        notify_mint(&env, "update_lend", &user, supply.amount_supply);
        (lend_paid, withdraw_liquidation)
    }

    /// Compound accrued interest into principal after paying the platform share.
    pub fn reinvest(env: Env, user: Address) -> u128 {
        ensure_initialized(&env);
        require_platform(&env);
        user.require_auth();
        let mut state = load_state(&env);
        update_interests(&env, &mut state);
        let mut supply = load_supply(&env, &user);
        settle_supply(&state, &mut supply);

        let share_rate = pool_value(&env, INTEREST_PLATFORM_SHARE);
        let platform_share = mul_div(supply.interests, share_rate, WAD);
        if platform_share > state.remain_supply {
            panic!("not enough platform share");
        }
        let reinvested = supply.interests - platform_share;
        supply.interests = 0;
        supply.amount_supply += reinvested;
        state.total_supply += reinvested;
        state.remain_supply -= platform_share;
        checkpoint_supply(&state, &mut supply);
        save_supply(&env, &user, &supply);
        save_state(&env, &state);
        pay_platform_share(&env, platform_share);

        Reinvest {
            user: user.clone(),
            reinvested,
            platform_share,
        }
        .publish(&env);
        notify_mint(&env, "update_lend", &user, supply.amount_supply);
        reinvested
    }

    /// Pledge `amount_collateral` more and borrow `expect_borrow` against the whole position.
    pub fn borrow(env: Env, user: Address, amount_collateral: u128, expect_borrow: u128) {
        ensure_initialized(&env);
        require_platform(&env);
        user.require_auth();
        if amount_collateral == 0 && expect_borrow == 0 {
            panic!("invalid amount");
        }
        let mut state = load_state(&env);
        update_interests(&env, &mut state);
        let mut position = load_borrow(&env, &user).unwrap_or_default();
        let listed = position.amount_collateral > 0;
        settle_borrow(&state, &mut position);

        let max_borrow = maximum_borrow_amount(&env, position.amount_collateral + amount_collateral);
        let debt = position.amount_borrow + position.interests;
        if debt + expect_borrow > max_borrow {
            panic!("exceed max allowed");
        }
        if expect_borrow > state.remain_supply {
            panic!("insufficient liquidity");
        }

        let pool = env.current_contract_address();
        if amount_collateral > 0 {
            let collateral = token::Client::new(&env, &collateral_token(&env));
            collateral.transfer(&user, &pool, &to_i128(amount_collateral));
            if let Some(strategy) = strategy(&env) {
                collateral.transfer(&pool, &strategy, &to_i128(amount_collateral));
                StrategyClient::new(&env, &strategy).invest(&user, &amount_collateral);
            }
        }
        position.amount_collateral += amount_collateral;
        if !listed && position.amount_collateral > 0 {
            position.index = push_borrower(&env, &user);
        }
        position.amount_borrow += expect_borrow;
        checkpoint_borrow(&state, &mut position);
        state.total_borrow += expect_borrow;
        state.total_pledge += amount_collateral;
        state.remain_supply -= expect_borrow;
        save_borrow(&env, &user, &position);
        save_state(&env, &state);

        if expect_borrow > 0 {
            token::Client::new(&env, &lend_token(&env)).transfer(
                &pool,
                &user,
                &to_i128(expect_borrow),
            );
        }

        BorrowEvent {
            user: user.clone(),
            amount_collateral,
            borrow_amount: expect_borrow,
            account_borrows: position.amount_borrow,
            total_borrows: state.total_borrow,
        }
        .publish(&env);
        notify_mint(&env, "update_borrow", &user, position.amount_borrow);
    }

    /// Release `amount_collateral` by paying back its share of principal and interest.
    /// Returns `(repay_amount, repay_interest)`.
    pub fn repay(env: Env, user: Address, amount_collateral: u128, max_repay: u128) -> (u128, u128) {
        ensure_initialized(&env);
        require_platform(&env);
        user.require_auth();
        if amount_collateral == 0 {
            panic!("invalid amount");
        }
        let mut state = load_state(&env);
        update_interests(&env, &mut state);
        let mut position = match load_borrow(&env, &user) {
            Some(position) => position,
            None => panic!("no position"),
        };
        settle_borrow(&state, &mut position);
        let (repay_amount, repay_interest) = repay_split(&position, amount_collateral);
        let total = repay_amount + repay_interest;
        if total > max_repay {
            panic!("repay limit exceeded");
        }

        let pool = env.current_contract_address();
        if total > 0 {
            token::Client::new(&env, &lend_token(&env)).transfer(&user, &pool, &to_i128(total));
        }

        position.amount_borrow -= repay_amount;
        position.interests -= repay_interest;
        position.amount_collateral -= amount_collateral;
        if position.amount_collateral == 0 {
            unlist_borrower(&env, &position);
        }
        checkpoint_borrow(&state, &mut position);
        state.total_borrow -= repay_amount;
        state.total_pledge -= amount_collateral;
        state.remain_supply += total;
        save_borrow(&env, &user, &position);
        save_state(&env, &state);

        match strategy(&env) {
            Some(strategy) => {
                StrategyClient::new(&env, &strategy).withdraw(&user, &amount_collateral, &user)
            }
            None => token::Client::new(&env, &collateral_token(&env)).transfer(
                &pool,
                &user,
                &to_i128(amount_collateral),
            ),
        }

        Repay {
            user: user.clone(),
            amount_collateral,
            repay_amount,
            repay_interest,
        }
        .publish(&env);
        notify_mint(&env, "update_borrow", &user, position.amount_borrow);
        (repay_amount, repay_interest)
    }

    /// Close an undercollateralized position into the suppliers' liquidation balance.
    /// Returns the collateral moved.
    pub fn liquidation(env: Env, liquidator: Address, user: Address) -> u128 {
        ensure_initialized(&env);
        require_platform(&env);
        liquidator.require_auth();
        let mut state = load_state(&env);
        update_interests(&env, &mut state);
        if load_supply(&env, &liquidator).amount_supply == 0 {
            panic!("only supplier");
        }
        let mut position = match load_borrow(&env, &user) {
            Some(position) if position.amount_collateral > 0 => position,
            _ => panic!("no position"),
        };
        settle_borrow(&state, &mut position);

        let expected_repay = position.amount_borrow + position.interests;
        let collateral_value = mul_div(position.amount_collateral, pool_value(&env, POOL_PRICE), WAD);
        let threshold = mul_div(collateral_value, pool_value(&env, POOL_LIQUIDATION_RATE), WAD);
        if expected_repay < threshold {
            panic!("not liquidable");
        }

        let amount_collateral = position.amount_collateral;
        state.liquidation_per_supply += mul_div(amount_collateral, WAD, state.total_supply);
        state.total_liquidation += amount_collateral;
        state.total_liq_supply_amount += expected_repay;
        state.total_borrow -= position.amount_borrow;

        push_liquidation(
            &env,
            LiquidationRecord {
                user: user.clone(),
                liquidator: liquidator.clone(),
                amount_collateral,
                liquidation_amount: expected_repay,
                ledger: env.ledger().sequence(),
            },
        );
        if let Some(strategy) = strategy(&env) {
            StrategyClient::new(&env, &strategy).liquidation(&user);
        }

        unlist_borrower(&env, &position);
        position.amount_collateral = 0;
        position.amount_borrow = 0;
        position.interests = 0;
        position.interest_settled = 0;
        save_borrow(&env, &user, &position);
        save_state(&env, &state);

        Liquidation {
            liquidator,
            user: user.clone(),
            amount_collateral,
            expected_repay,
        }
        .publish(&env);
        notify_mint(&env, "update_borrow", &user, 0);
        amount_collateral
    }

    /// Move all collateral from the current strategy (if any) to `new_strategy` (if any).
    /// The previous strategy keeps paying out rewards it already earned.
    pub fn switch_strategy(env: Env, new_strategy: Option<Address>) {
        ensure_initialized(&env);
        require_platform(&env);
        let pool = env.current_contract_address();
        let old_strategy = strategy(&env);
        if let Some(new) = &new_strategy {
            let client = StrategyClient::new(&env, new);
            if old_strategy.as_ref() == Some(new)
                || client.pool() != pool
                || client.collateral_token() != collateral_token(&env)
                || client.developer() != config(&env).developer()
            {
                panic!("strategy mismatch");
            }
        }

        let held = match &old_strategy {
            Some(old) => StrategyClient::new(&env, old).exit(),
            None => load_state(&env).total_pledge + total_unclaimed(&env),
        };

        let mut migrated = 0u128;
        if let Some(new) = &new_strategy {
            let mut positions: Vec<(Address, u128)> = Vec::new(&env);
            let mut staked = 0u128;
            // only open positions are listed
            for index in 0..borrower_count(&env) {
                if let Some(user) = borrower_at(&env, index) {
                    if let Some(position) = load_borrow(&env, &user) {
                        staked += position.amount_collateral;
                        positions.push_back((user, position.amount_collateral));
                    }
                }
            }
            if held > 0 {
                token::Client::new(&env, &collateral_token(&env)).transfer(
                    &pool,
                    new,
                    &to_i128(held),
                );
            }
            StrategyClient::new(&env, new).migrate(&positions, &held.saturating_sub(staked));
            migrated = held;
        }
        set_strategy(&env, &new_strategy);

        StrategySwitched {
            old_strategy,
            new_strategy,
            migrated,
        }
        .publish(&env);
    }

    /// Pay out liquidated collateral that a strategy failed to release earlier.
    pub fn claim_collateral(env: Env, user: Address) -> u128 {
        ensure_initialized(&env);
        require_platform(&env);
        user.require_auth();
        let amount = unclaimed_collateral(&env, &user);
        if amount == 0 {
            panic!("nothing to claim");
        }
        set_unclaimed_collateral(&env, &user, 0);
        match strategy(&env) {
            Some(strategy) => {
                let _: () = call_contract_or_panic(
                    &env,
                    &strategy,
                    "release",
                    (amount, user.clone()),
                );
            }
            None => token::Client::new(&env, &collateral_token(&env)).transfer(
                &env.current_contract_address(),
                &user,
                &to_i128(amount),
            ),
        }
        CollateralClaimed {
            user: user.clone(),
            amount,
        }
        .publish(&env);
        amount
    }

    pub fn get_maximum_borrow_amount(env: Env, amount_collateral: u128) -> u128 {
        ensure_initialized(&env);
        maximum_borrow_amount(&env, amount_collateral)
    }

    /// Principal plus interest due to release `amount_collateral` at the current ledger.
    pub fn get_repay_amount(env: Env, amount_collateral: u128, user: Address) -> u128 {
        ensure_initialized(&env);
        let mut state = load_state(&env);
        update_interests(&env, &mut state);
        match load_borrow(&env, &user) {
            Some(mut position) => {
                settle_borrow(&state, &mut position);
                let (repay_amount, repay_interest) = repay_split(&position, amount_collateral);
                repay_amount + repay_interest
            }
            None => 0,
        }
    }

    /// Current per-ledger borrow rate, WAD scaled.
    pub fn get_interests(env: Env) -> u128 {
        ensure_initialized(&env);
        interest_rate(&env, &load_state(&env))
    }

    /// Accounting totals projected to the current ledger.
    pub fn get_state(env: Env) -> PoolState {
        ensure_initialized(&env);
        let mut state = load_state(&env);
        update_interests(&env, &mut state);
        state
    }

    pub fn get_supply(env: Env, user: Address) -> Supply {
        load_supply(&env, &user)
    }

    pub fn get_borrow(env: Env, user: Address) -> Borrow {
        load_borrow(&env, &user).unwrap_or_default()
    }

    /// Interest the user could withdraw right now, before the platform share.
    pub fn pending_interests(env: Env, user: Address) -> u128 {
        ensure_initialized(&env);
        let mut state = load_state(&env);
        update_interests(&env, &mut state);
        let mut supply = load_supply(&env, &user);
        settle_supply(&state, &mut supply);
        supply.interests
    }

    pub fn liquidation_history(env: Env, user: Address) -> Vec<LiquidationRecord> {
        liquidation_history(&env, &user)
    }

    pub fn liquidation_history_length(env: Env, user: Address) -> u32 {
        liquidation_history(&env, &user).len()
    }

    /// Number of borrowers with collateral pledged.
    pub fn borrowers_length(env: Env) -> u32 {
        borrower_count(&env)
    }

    pub fn borrower_at(env: Env, index: u32) -> Address {
        match borrower_at(&env, index) {
            Some(user) => user,
            None => panic!("borrower not found"),
        }
    }

    pub fn unclaimed_collateral(env: Env, user: Address) -> u128 {
        unclaimed_collateral(&env, &user)
    }

    pub fn strategy(env: Env) -> Option<Address> {
        strategy(&env)
    }

    pub fn lend_token(env: Env) -> Address {
        ensure_initialized(&env);
        lend_token(&env)
    }

    pub fn collateral_token(env: Env) -> Address {
        ensure_initialized(&env);
        collateral_token(&env)
    }
}

fn pool_value(env: &Env, key: &str) -> u128 {
    config(env).get_pool_value(&env.current_contract_address(), &Symbol::new(env, key))
}

fn interest_rate(env: &Env, state: &PoolState) -> u128 {
    let pool_size = state.total_borrow + state.remain_supply;
    if pool_size == 0 {
        return 0;
    }
    let frenzy = mul_div(state.total_borrow, pool_value(env, POOL_MARKET_FRENZY), pool_size);
    (pool_value(env, POOL_BASE_INTERESTS) + frenzy) / LEDGERS_PER_YEAR
}

/// Advance the accumulators to the current ledger. Callers persist `state`.
fn update_interests(env: &Env, state: &mut PoolState) {
    let now = env.ledger().sequence();
    if now <= state.last_interest_update {
        return;
    }
    let elapsed = (now - state.last_interest_update) as u128;
    state.last_interest_update = now;
    if state.total_borrow == 0 || state.total_supply == 0 {
        return;
    }
    let accrued = interest_rate(env, state).saturating_mul(elapsed);
    if accrued == 0 {
        return;
    }
    state.interest_per_supply += mul_div(accrued, state.total_borrow, state.total_supply);
    state.interest_per_borrow += accrued;
    InterestAccrued {
        interest_per_supply: state.interest_per_supply,
        interest_per_borrow: state.interest_per_borrow,
        total_borrow: state.total_borrow,
    }
    .publish(env);
}

fn settle_supply(state: &PoolState, supply: &mut Supply) {
    supply.interests += mul_div(supply.amount_supply, state.interest_per_supply, WAD)
        .saturating_sub(supply.interest_settled);
    supply.liquidation += mul_div(supply.amount_supply, state.liquidation_per_supply, WAD)
        .saturating_sub(supply.liquidation_settled);
}

fn checkpoint_supply(state: &PoolState, supply: &mut Supply) {
    supply.interest_settled = mul_div(supply.amount_supply, state.interest_per_supply, WAD);
    supply.liquidation_settled = mul_div(supply.amount_supply, state.liquidation_per_supply, WAD);
}

fn settle_borrow(state: &PoolState, position: &mut Borrow) {
    position.interests += mul_div(position.amount_borrow, state.interest_per_borrow, WAD)
        .saturating_sub(position.interest_settled);
}

fn checkpoint_borrow(state: &PoolState, position: &mut Borrow) {
    position.interest_settled = mul_div(position.amount_borrow, state.interest_per_borrow, WAD);
}

fn maximum_borrow_amount(env: &Env, amount_collateral: u128) -> u128 {
    let value = mul_div(amount_collateral, pool_value(env, POOL_PRICE), WAD);
    mul_div(value, pool_value(env, POOL_PLEDGE_RATE), WAD)
}

fn repay_split(position: &Borrow, amount_collateral: u128) -> (u128, u128) {
    if amount_collateral > position.amount_collateral {
        panic!("not enough collateral");
    }
    let repay_amount = mul_div(position.amount_borrow, amount_collateral, position.amount_collateral);
    let repay_interest = mul_div(position.interests, amount_collateral, position.amount_collateral);
    (repay_amount, repay_interest)
}

/// Drop a closed position from the open-borrower list, keeping the moved slot's index in sync.
fn unlist_borrower(env: &Env, position: &Borrow) {
    if let Some(moved) = remove_borrower(env, position.index) {
        if let Some(mut other) = load_borrow(env, &moved) {
            other.index = position.index;
            save_borrow(env, &moved, &other);
        }
    }
}

fn wallet(env: &Env, name: &str) -> Address {
    match config(env).wallet(&Symbol::new(env, name)) {
        Some(addr) => addr,
        None => panic!("wallet not set"),
    }
}

/// Split the platform's cut of interest between the team and reward wallets.
/// `remain_supply` must already account for `amount`.
fn pay_platform_share(env: &Env, amount: u128) {
    if amount == 0 {
        return;
    }
    let team = wallet(env, WALLET_TEAM);
    let reward = wallet(env, WALLET_REWARD);
    let team_amount = mul_div(amount, pool_value(env, INTEREST_BUYBACK_SHARE), WAD).min(amount);
    let reward_amount = amount - team_amount;
    let lend = token::Client::new(env, &lend_token(env));
    let pool = env.current_contract_address();
    if team_amount > 0 {
        lend.transfer(&pool, &team, &to_i128(team_amount));
    }
    if reward_amount > 0 {
        lend.transfer(&pool, &reward, &to_i128(reward_amount));
    }
    PlatformShareDistributed {
        team,
        reward,
        team_amount,
        reward_amount,
    }
    .publish(env);
}

/// Send liquidated collateral to a withdrawing supplier. A failing strategy defers the
/// payout to `claim_collateral` instead of reverting the withdrawal.
fn release_liquidated_collateral(env: &Env, user: &Address, amount: u128) {
    match strategy(env) {
        Some(strategy) => {
            if let Err(err) =
                try_call_contract::<(), _>(env, &strategy, "release", (amount, user.clone()))
            {
                emit_external_call_failure(env, &strategy, &err, true);
                let owed = unclaimed_collateral(env, user) + amount;
                set_unclaimed_collateral(env, user, owed);
                CollateralDeferred {
                    user: user.clone(),
                    amount,
                }
                .publish(env);
            }
        }
        None => token::Client::new(env, &collateral_token(env)).transfer(
            &env.current_contract_address(),
            user,
            &to_i128(amount),
        ),
    }
}

/// Report a position size to the emission contract. Never blocks pool accounting.
fn notify_mint(env: &Env, func: &str, user: &Address, amount: u128) {
    if let Some(mint) = config(env).mint() {
        if let Err(err) = try_call_contract::<(), _>(
            env,
            &mint,
            func,
            (env.current_contract_address(), user.clone(), amount),
        ) {
            emit_external_call_failure(env, &mint, &err, true);
        }
    }
}
