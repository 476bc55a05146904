#![cfg(test)]

use super::*;
use crate::storage::{BPS, MINT_AMOUNT_PER_BLOCK, MINT_BORROW_PERCENT, WALLET_SPARE, WALLET_TEAM};
use pairlend_config::{PairlendConfig, PairlendConfigClient};
use pairlend_factory::{PairlendFactory, PairlendFactoryClient};
use pairlend_pool::LendingPool;
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{token, vec, Address, Env, Symbol};

struct Setup<'a> {
    env: Env,
    mint: PairlendMintClient<'a>,
    config: PairlendConfigClient<'a>,
    developer: Address,
    pool: Address,
    team: Address,
    spare: Address,
    protocol: token::Client<'a>,
}

fn setup<'a>(funded: u128) -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    let developer = Address::generate(&env);
    let platform = Address::generate(&env);
    let team = Address::generate(&env);
    let spare = Address::generate(&env);

    let factory_id = env.register(PairlendFactory, ());
    let config_id = env.register(PairlendConfig, ());
    let config = PairlendConfigClient::new(&env, &config_id);
    config.initialize(&developer, &platform, &factory_id, &Address::generate(&env));
    config.init_parameter(&developer);
    config.set_wallets(
        &developer,
        &vec![
            &env,
            Symbol::new(&env, WALLET_TEAM),
            Symbol::new(&env, WALLET_SPARE),
        ],
        &vec![&env, team.clone(), spare.clone()],
    );
    config.set_value(&developer, &Symbol::new(&env, MINT_AMOUNT_PER_BLOCK), &100u128);

    let factory = PairlendFactoryClient::new(&env, &factory_id);
    factory.initialize(&developer, &config_id);
    let pool = env.register(LendingPool, ());
    factory.create_pool(
        &developer,
        &Address::generate(&env),
        &Address::generate(&env),
        &pool,
    );

    let token_id = env
        .register_stellar_asset_contract_v2(developer.clone())
        .address();
    token::StellarAssetClient::new(&env, &token_id).mint(&developer, &1_000_000i128);

    let mint_id = env.register(PairlendMint, ());
    config.set_mint(&developer, &mint_id, &token_id);
    let mint = PairlendMintClient::new(&env, &mint_id);
    mint.initialize(&config_id);
    if funded > 0 {
        mint.add_mint_amount(&developer, &funded);
    }

    Setup {
        mint,
        config,
        developer,
        pool,
        team,
        spare,
        protocol: token::Client::new(&env, &token_id),
        env,
    }
}

fn advance(env: &Env, ledgers: u32) {
    env.ledger().with_mut(|li| li.sequence_number += ledgers);
}

#[test]
fn test_emission_splits_between_lenders_and_borrowers() {
    let s = setup(100_000);
    let lender = Address::generate(&s.env);
    let borrower = Address::generate(&s.env);
    s.mint.update_lend(&s.pool, &lender, &1_000u128);
    s.mint.update_borrow(&s.pool, &borrower, &500u128);
    advance(&s.env, 10);

    assert_eq!(s.mint.pending_lend(&s.pool, &lender), 500u128);
    assert_eq!(s.mint.pending_borrow(&s.pool, &borrower), 500u128);
    assert_eq!(s.mint.remaining(), 99_000u128);

    assert_eq!(s.mint.mint_lender(&lender, &s.pool), 425u128);
    assert_eq!(s.protocol.balance(&lender), 425i128);
    assert_eq!(s.protocol.balance(&s.team), 50i128);
    assert_eq!(s.protocol.balance(&s.spare), 25i128);
    assert_eq!(s.mint.pending_lend(&s.pool, &lender), 0u128);
}

#[test]
fn test_lenders_share_by_productivity() {
    let s = setup(100_000);
    let a = Address::generate(&s.env);
    let b = Address::generate(&s.env);
    s.mint.update_lend(&s.pool, &a, &100u128);
    s.mint.update_lend(&s.pool, &b, &300u128);
    advance(&s.env, 4);

    assert_eq!(s.mint.pending_lend(&s.pool, &a), 50u128);
    assert_eq!(s.mint.pending_lend(&s.pool, &b), 150u128);
    // nobody borrows, so the borrow half stays unallocated
    assert_eq!(s.mint.remaining(), 99_800u128);
}

#[test]
fn test_emission_stops_when_funds_run_out() {
    let s = setup(100);
    let lender = Address::generate(&s.env);
    let borrower = Address::generate(&s.env);
    s.mint.update_lend(&s.pool, &lender, &10u128);
    s.mint.update_borrow(&s.pool, &borrower, &10u128);
    advance(&s.env, 5);
    assert_eq!(s.mint.remaining(), 0u128);
    advance(&s.env, 5);
    assert_eq!(s.mint.pending_lend(&s.pool, &lender), 50u128);
    assert_eq!(s.mint.pending_borrow(&s.pool, &borrower), 50u128);
}

#[test]
fn test_sync_applies_new_schedule_from_now_on() {
    let s = setup(100_000);
    let lender = Address::generate(&s.env);
    s.mint.update_lend(&s.pool, &lender, &1_000u128);
    advance(&s.env, 10);

    s.config.set_value(
        &s.developer,
        &Symbol::new(&s.env, MINT_AMOUNT_PER_BLOCK),
        &20u128,
    );
    assert_eq!(s.mint.amount_per_block(), 100u128);
    s.mint.sync();
    assert_eq!(s.mint.amount_per_block(), 20u128);
    advance(&s.env, 10);
    assert_eq!(s.mint.pending_lend(&s.pool, &lender), 600u128);
}

#[test]
fn test_borrow_percent_is_read_on_sync() {
    let s = setup(100_000);
    let lender = Address::generate(&s.env);
    let borrower = Address::generate(&s.env);
    s.config.set_value(
        &s.developer,
        &Symbol::new(&s.env, MINT_BORROW_PERCENT),
        &2_000u128,
    );
    s.mint.sync();
    s.mint.update_lend(&s.pool, &lender, &1u128);
    s.mint.update_borrow(&s.pool, &borrower, &1u128);
    advance(&s.env, 10);
    assert_eq!(s.mint.pending_lend(&s.pool, &lender), 800u128);
    assert_eq!(s.mint.pending_borrow(&s.pool, &borrower), 200u128);
}

#[test]
fn test_reducing_productivity_keeps_earned_rewards() {
    let s = setup(100_000);
    let lender = Address::generate(&s.env);
    s.mint.update_lend(&s.pool, &lender, &1_000u128);
    advance(&s.env, 10);
    s.mint.update_lend(&s.pool, &lender, &0u128);
    advance(&s.env, 10);

    assert_eq!(s.mint.pending_lend(&s.pool, &lender), 500u128);
    assert_eq!(s.mint.get_state().total_lend_productivity, 0u128);
    assert_eq!(s.mint.remaining(), 99_500u128);
}

#[test]
fn test_claim_pays_both_sides() {
    let s = setup(100_000);
    let user = Address::generate(&s.env);
    s.mint.update_lend(&s.pool, &user, &10u128);
    s.mint.update_borrow(&s.pool, &user, &10u128);
    advance(&s.env, 2);
    assert_eq!(s.mint.claim(&user, &s.pool), 170u128);
    assert_eq!(s.protocol.balance(&user), 170i128);
}

#[test]
#[should_panic(expected = "not pool")]
fn test_unknown_pool_cannot_report() {
    let s = setup(0);
    let stranger = Address::generate(&s.env);
    s.mint
        .update_lend(&stranger, &Address::generate(&s.env), &10u128);
}

#[test]
#[should_panic(expected = "not admin")]
fn test_only_developer_funds_emission() {
    let s = setup(0);
    s.mint
        .add_mint_amount(&Address::generate(&s.env), &10u128);
}

#[test]
fn test_initialize_caps_borrow_percent() {
    let env = Env::default();
    env.mock_all_auths();
    let developer = Address::generate(&env);
    let config_id = env.register(PairlendConfig, ());
    let config = PairlendConfigClient::new(&env, &config_id);
    config.initialize(
        &developer,
        &Address::generate(&env),
        &Address::generate(&env),
        &Address::generate(&env),
    );
    config.init_parameter(&developer);
    config.set_value(&developer, &Symbol::new(&env, MINT_BORROW_PERCENT), &20_000u128);

    let mint = PairlendMintClient::new(&env, &env.register(PairlendMint, ()));
    mint.initialize(&config_id);
    assert_eq!(mint.get_state().borrow_percent, BPS);
}
