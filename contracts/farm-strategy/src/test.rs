#![cfg(test)]

use super::*;
use mock_farm::{MockFarm, MockFarmClient};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{token, vec, Address, Env};

struct Setup<'a> {
    env: Env,
    strategy: FarmStrategyClient<'a>,
    farm: MockFarmClient<'a>,
    developer: Address,
    pool: Address,
    collateral: token::Client<'a>,
    collateral_admin: token::StellarAssetClient<'a>,
    reward: token::Client<'a>,
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    let admin = Address::generate(&env);
    let developer = Address::generate(&env);
    let pool = Address::generate(&env);

    let collateral_id = env.register_stellar_asset_contract_v2(admin.clone()).address();
    let reward_id = env.register_stellar_asset_contract_v2(admin.clone()).address();

    let farm_id = env.register(MockFarm, ());
    let farm = MockFarmClient::new(&env, &farm_id);
    farm.initialize(&collateral_id, &reward_id, &100i128);
    token::StellarAssetClient::new(&env, &reward_id).mint(&farm_id, &1_000_000i128);

    let strategy_id = env.register(FarmStrategy, ());
    let strategy = FarmStrategyClient::new(&env, &strategy_id);
    strategy.initialize(&developer, &reward_id, &collateral_id, &pool, &farm_id);

    Setup {
        strategy,
        farm,
        developer,
        pool,
        collateral: token::Client::new(&env, &collateral_id),
        collateral_admin: token::StellarAssetClient::new(&env, &collateral_id),
        reward: token::Client::new(&env, &reward_id),
        env,
    }
}

fn advance(env: &Env, ledgers: u32) {
    env.ledger().with_mut(|li| li.sequence_number += ledgers);
}

/// Simulates the pool handing collateral over before calling `invest`.
fn invest(s: &Setup, user: &Address, amount: u128) {
    s.collateral_admin
        .mint(&s.strategy.address, &(amount as i128));
    s.strategy.invest(user, &amount);
}

#[test]
fn test_rewards_split_by_productivity() {
    let s = setup();
    let a = Address::generate(&s.env);
    let b = Address::generate(&s.env);

    invest(&s, &a, 100);
    advance(&s.env, 10);
    invest(&s, &b, 300);
    advance(&s.env, 10);

    assert_eq!(s.strategy.mint(&a), 1_250u128);
    assert_eq!(s.reward.balance(&a), 1_250i128);
    assert_eq!(s.strategy.pending(&b), 750u128);
    assert_eq!(s.strategy.total_productivity(), 400u128);
    assert_eq!(s.farm.staked(&s.strategy.address), 400i128);
}

#[test]
fn test_pending_includes_unharvested_farm_rewards() {
    let s = setup();
    let a = Address::generate(&s.env);
    invest(&s, &a, 50);
    advance(&s.env, 4);
    assert_eq!(s.strategy.pending(&a), 400u128);
    assert_eq!(s.strategy.mint(&a), 400u128);
    assert_eq!(s.strategy.pending(&a), 0u128);
}

#[test]
fn test_withdraw_returns_collateral_and_keeps_rewards() {
    let s = setup();
    let a = Address::generate(&s.env);
    invest(&s, &a, 100);
    advance(&s.env, 5);
    s.strategy.withdraw(&a, &40u128, &a);

    assert_eq!(s.collateral.balance(&a), 40i128);
    assert_eq!(s.strategy.productivity(&a), 60u128);
    assert_eq!(s.farm.staked(&s.strategy.address), 60i128);
    assert_eq!(s.strategy.pending(&a), 500u128);
}

#[test]
#[should_panic(expected = "insufficient productivity")]
fn test_withdraw_more_than_productivity_panics() {
    let s = setup();
    let a = Address::generate(&s.env);
    invest(&s, &a, 100);
    s.strategy.withdraw(&a, &101u128, &a);
}

#[test]
fn test_liquidation_moves_stake_out_of_rewards() {
    let s = setup();
    let a = Address::generate(&s.env);
    let b = Address::generate(&s.env);
    let supplier = Address::generate(&s.env);
    invest(&s, &a, 100);
    invest(&s, &b, 100);
    advance(&s.env, 10);

    s.strategy.liquidation(&a);
    assert_eq!(s.strategy.productivity(&a), 0u128);
    assert_eq!(s.strategy.liquidated_stake(), 100u128);
    assert_eq!(s.strategy.total_productivity(), 100u128);

    // a keeps what was earned before liquidation, b now takes the whole stream
    advance(&s.env, 10);
    assert_eq!(s.strategy.mint(&a), 500u128);
    assert_eq!(s.strategy.mint(&b), 1_500u128);

    s.strategy.release(&60u128, &supplier);
    assert_eq!(s.collateral.balance(&supplier), 60i128);
    assert_eq!(s.strategy.liquidated_stake(), 40u128);
}

#[test]
fn test_exit_returns_collateral_and_freezes_rewards() {
    let s = setup();
    let a = Address::generate(&s.env);
    invest(&s, &a, 100);
    advance(&s.env, 3);

    let returned = s.strategy.exit();
    assert_eq!(returned, 100u128);
    assert_eq!(s.collateral.balance(&s.pool), 100i128);
    assert!(!s.strategy.is_active());

    advance(&s.env, 10);
    assert_eq!(s.strategy.pending(&a), 300u128);
    assert_eq!(s.strategy.mint(&a), 300u128);
}

#[test]
#[should_panic(expected = "strategy inactive")]
fn test_invest_after_exit_panics() {
    let s = setup();
    let a = Address::generate(&s.env);
    s.strategy.exit();
    invest(&s, &a, 10);
}

#[test]
fn test_migrate_restores_positions() {
    let s = setup();
    let a = Address::generate(&s.env);
    let b = Address::generate(&s.env);
    s.collateral_admin.mint(&s.strategy.address, &350i128);
    s.strategy.migrate(
        &vec![&s.env, (a.clone(), 100u128), (b.clone(), 200u128)],
        &50u128,
    );
    assert_eq!(s.strategy.productivity(&a), 100u128);
    assert_eq!(s.strategy.productivity(&b), 200u128);
    assert_eq!(s.strategy.liquidated_stake(), 50u128);
    assert_eq!(s.farm.staked(&s.strategy.address), 350i128);

    // the farm pays 299 of 300 after rounding its per-share accumulator
    advance(&s.env, 3);
    assert_eq!(s.strategy.mint(&b), 199u128);
}

#[test]
#[should_panic(expected = "already migrated")]
fn test_migrate_twice_panics() {
    let s = setup();
    let a = Address::generate(&s.env);
    invest(&s, &a, 10);
    s.strategy.migrate(&vec![&s.env, (a, 10u128)], &0u128);
}

#[test]
fn test_exit_sweeps_rewards_nobody_holds() {
    let s = setup();
    let a = Address::generate(&s.env);
    invest(&s, &a, 100);
    s.strategy.liquidation(&a);
    assert_eq!(s.strategy.total_productivity(), 0u128);

    advance(&s.env, 5);
    assert_eq!(s.strategy.exit(), 100u128);
    assert_eq!(s.reward.balance(&s.developer), 500i128);
    assert_eq!(s.reward.balance(&s.strategy.address), 0i128);
    assert_eq!(s.strategy.mint(&a), 0u128);
}

#[test]
#[should_panic(expected = "invalid reward token")]
fn test_reward_token_must_differ_from_collateral() {
    let s = setup();
    let id = s.env.register(FarmStrategy, ());
    let other = FarmStrategyClient::new(&s.env, &id);
    other.initialize(
        &s.developer,
        &s.collateral.address,
        &s.collateral.address,
        &s.pool,
        &s.farm.address,
    );
}

#[test]
#[should_panic(expected = "Error(Auth, InvalidAction)")]
fn test_initialize_requires_developer_auth() {
    let env = Env::default();
    let id = env.register(FarmStrategy, ());
    let strategy = FarmStrategyClient::new(&env, &id);
    strategy.initialize(
        &Address::generate(&env),
        &Address::generate(&env),
        &Address::generate(&env),
        &Address::generate(&env),
        &Address::generate(&env),
    );
}
