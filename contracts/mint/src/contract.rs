use soroban_sdk::{contract, contractimpl, token, Address, Env, Symbol};

use crate::events::*;
use crate::storage::*;

/// Emits the protocol token to lenders and borrowers of every indexed pool in
/// proportion to their productivity.
#[contract]
pub struct PairlendMint;

#[contractimpl]
impl PairlendMint {
    pub fn initialize(env: Env, config: Address) {
        if env.storage().instance().has(&DataKey::Initialized) {
            panic!("already initialized");
        }
        let registry = ConfigClient::new(&env, &config);
        registry.developer().require_auth();
        env.storage().persistent().set(&DataKey::Config, &config);
        let state = MintState {
            amount_per_block: registry.get_value(&Symbol::new(&env, MINT_AMOUNT_PER_BLOCK)),
            borrow_percent: registry
                .get_value(&Symbol::new(&env, MINT_BORROW_PERCENT))
                .min(BPS),
            last_ledger: env.ledger().sequence(),
            ..MintState::default()
        };
        save_state(&env, &state);
        env.storage().instance().set(&DataKey::Initialized, &true);
        ensure_initialized(&env);
    }

    /// Fund future emission with protocol tokens held by the developer.
    pub fn add_mint_amount(env: Env, developer: Address, amount: u128) {
        ensure_initialized(&env);
        let registry = config(&env);
        if registry.developer() != developer {
            panic!("not admin");
        }
        developer.require_auth();
        if amount == 0 {
            panic!("invalid amount");
        }
        let mut state = load_state(&env);
        accrue(&env, &mut state);
        token::Client::new(&env, &protocol_token(&env)).transfer(
            &developer,
            &env.current_contract_address(),
            &to_i128(amount),
        );
        state.remaining += amount;
        save_state(&env, &state);
        MintFunded {
            developer,
            amount,
            remaining: state.remaining,
        }
        .publish(&env);
    }

    /// Settle emission at the old schedule, then pick up the registry's current one.
    pub fn sync(env: Env) {
        ensure_initialized(&env);
        let registry = config(&env);
        let mut state = load_state(&env);
        accrue(&env, &mut state);
        state.amount_per_block = registry.get_value(&Symbol::new(&env, MINT_AMOUNT_PER_BLOCK));
        state.borrow_percent = registry
            .get_value(&Symbol::new(&env, MINT_BORROW_PERCENT))
            .min(BPS);
        save_state(&env, &state);
        MintSynced {
            amount_per_block: state.amount_per_block,
            borrow_percent: state.borrow_percent,
        }
        .publish(&env);
    }

    /// Report `user`'s supply in `pool`. Called by the pool.
    pub fn update_lend(env: Env, pool: Address, user: Address, amount: u128) {
        update_productivity(&env, pool, user, amount, false);
    }

    /// Report `user`'s outstanding borrow in `pool`. Called by the pool.
    pub fn update_borrow(env: Env, pool: Address, user: Address, amount: u128) {
        update_productivity(&env, pool, user, amount, true);
    }

    pub fn pending_lend(env: Env, pool: Address, user: Address) -> u128 {
        pending(&env, &pool, &user, false)
    }

    pub fn pending_borrow(env: Env, pool: Address, user: Address) -> u128 {
        pending(&env, &pool, &user, true)
    }

    pub fn mint_lender(env: Env, user: Address, pool: Address) -> u128 {
        user.require_auth();
        ensure_initialized(&env);
        let mut state = load_state(&env);
        accrue(&env, &mut state);
        let paid = mint_position(&env, &mut state, &pool, &user, false);
        save_state(&env, &state);
        paid
    }

    pub fn mint_borrower(env: Env, user: Address, pool: Address) -> u128 {
        user.require_auth();
        ensure_initialized(&env);
        let mut state = load_state(&env);
        accrue(&env, &mut state);
        let paid = mint_position(&env, &mut state, &pool, &user, true);
        save_state(&env, &state);
        paid
    }

    /// Both sides at once. Returns what reached the user after the team and spare cuts.
    pub fn claim(env: Env, user: Address, pool: Address) -> u128 {
        user.require_auth();
        ensure_initialized(&env);
        let mut state = load_state(&env);
        accrue(&env, &mut state);
        let lend = mint_position(&env, &mut state, &pool, &user, false);
        let borrow = mint_position(&env, &mut state, &pool, &user, true);
        save_state(&env, &state);
        lend + borrow
    }

    /// Funded tokens not yet allocated to anyone.
    pub fn remaining(env: Env) -> u128 {
        ensure_initialized(&env);
        let mut state = load_state(&env);
        accrue(&env, &mut state);
        state.remaining
    }

    pub fn amount_per_block(env: Env) -> u128 {
        load_state(&env).amount_per_block
    }

    pub fn get_state(env: Env) -> MintState {
        ensure_initialized(&env);
        let mut state = load_state(&env);
        accrue(&env, &mut state);
        state
    }

    pub fn get_position(env: Env, pool: Address, user: Address, borrow_side: bool) -> Position {
        load_position(&env, &pool, &user, borrow_side)
    }
}

fn update_productivity(env: &Env, pool: Address, user: Address, amount: u128, borrow_side: bool) {
    ensure_initialized(env);
    pool.require_auth();
    let registry = config(env);
    if !FactoryClient::new(env, &registry.factory()).is_pool(&pool) {
        panic!("not pool");
    }
    let power = registry.get_pool_value(&pool, &Symbol::new(env, POOL_MINT_POWER));
    let productivity = mul_div(amount, power, BPS);

    let mut state = load_state(env);
    accrue(env, &mut state);
    let mut position = load_position(env, &pool, &user, borrow_side);
    let acc = accumulator(&state, borrow_side);
    settle(acc, &mut position);
    if borrow_side {
        state.total_borrow_productivity =
            state.total_borrow_productivity - position.productivity + productivity;
    } else {
        state.total_lend_productivity =
            state.total_lend_productivity - position.productivity + productivity;
    }
    position.productivity = productivity;
    checkpoint(acc, &mut position);
    save_position(env, &pool, &user, borrow_side, &position);
    save_state(env, &state);

    ProductivityChanged {
        pool,
        user,
        borrow_side,
        productivity,
    }
    .publish(env);
}

fn pending(env: &Env, pool: &Address, user: &Address, borrow_side: bool) -> u128 {
    ensure_initialized(env);
    let mut state = load_state(env);
    accrue(env, &mut state);
    let mut position = load_position(env, pool, user, borrow_side);
    settle(accumulator(&state, borrow_side), &mut position);
    position.reward_earn
}

fn mint_position(
    env: &Env,
    state: &mut MintState,
    pool: &Address,
    user: &Address,
    borrow_side: bool,
) -> u128 {
    let acc = accumulator(state, borrow_side);
    let mut position = load_position(env, pool, user, borrow_side);
    settle(acc, &mut position);
    let amount = position.reward_earn;
    position.reward_earn = 0;
    checkpoint(acc, &mut position);
    save_position(env, pool, user, borrow_side, &position);
    if amount == 0 {
        return 0;
    }

    let registry = config(env);
    let team_amount = mul_div(amount, registry.get_value(&Symbol::new(env, MINT_TEAM_SHARE)), WAD);
    let spare_amount = mul_div(amount, registry.get_value(&Symbol::new(env, MINT_SPARE_SHARE)), WAD);
    let user_amount = amount.saturating_sub(team_amount + spare_amount);

    let protocol = token::Client::new(env, &protocol_token(env));
    let this = env.current_contract_address();
    if user_amount > 0 {
        protocol.transfer(&this, user, &to_i128(user_amount));
    }
    if team_amount > 0 {
        protocol.transfer(&this, &wallet(env, WALLET_TEAM), &to_i128(team_amount));
    }
    if spare_amount > 0 {
        protocol.transfer(&this, &wallet(env, WALLET_SPARE), &to_i128(spare_amount));
    }

    Minted {
        pool: pool.clone(),
        user: user.clone(),
        borrow_side,
        user_amount,
        team_amount,
        spare_amount,
    }
    .publish(env);
    user_amount
}

/// Release emission for the ledgers since the last update. A side with no
/// productivity leaves its part in `remaining`.
fn accrue(env: &Env, state: &mut MintState) {
    let now = env.ledger().sequence();
    if now <= state.last_ledger {
        return;
    }
    let elapsed = (now - state.last_ledger) as u128;
    state.last_ledger = now;
    let emitted = state
        .amount_per_block
        .saturating_mul(elapsed)
        .min(state.remaining);
    if emitted == 0 {
        return;
    }
    let borrow_part = mul_div(emitted, state.borrow_percent, BPS);
    let lend_part = emitted - borrow_part;
    if state.total_lend_productivity > 0 && lend_part > 0 {
        state.acc_lend_per_share += mul_div(lend_part, WAD, state.total_lend_productivity);
        state.remaining -= lend_part;
    }
    if state.total_borrow_productivity > 0 && borrow_part > 0 {
        state.acc_borrow_per_share += mul_div(borrow_part, WAD, state.total_borrow_productivity);
        state.remaining -= borrow_part;
    }
}

fn accumulator(state: &MintState, borrow_side: bool) -> u128 {
    if borrow_side {
        state.acc_borrow_per_share
    } else {
        state.acc_lend_per_share
    }
}

fn settle(acc: u128, position: &mut Position) {
    position.reward_earn +=
        mul_div(position.productivity, acc, WAD).saturating_sub(position.reward_debt);
}

fn checkpoint(acc: u128, position: &mut Position) {
    position.reward_debt = mul_div(position.productivity, acc, WAD);
}

fn protocol_token(env: &Env) -> Address {
    match config(env).token() {
        Some(token) => token,
        None => panic!("token not set"),
    }
}

fn wallet(env: &Env, name: &str) -> Address {
    match config(env).wallet(&Symbol::new(env, name)) {
        Some(addr) => addr,
        None => panic!("wallet not set"),
    }
}

fn mul_div(a: u128, b: u128, c: u128) -> u128 {
    if c == 0 {
        panic!("division by zero");
    }
    match a.checked_mul(b) {
        Some(product) => product / c,
        None => panic!("math overflow"),
    }
}

fn to_i128(amount: u128) -> i128 {
    if amount > i128::MAX as u128 {
        panic!("amount exceeds i128");
    }
    amount as i128
}
