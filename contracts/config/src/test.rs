#![cfg(test)]

use super::*;
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{vec, Address, Env, Symbol};

struct Setup<'a> {
    env: Env,
    client: PairlendConfigClient<'a>,
    developer: Address,
    platform: Address,
    factory: Address,
    price_wallet: Address,
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    let developer = Address::generate(&env);
    let platform = Address::generate(&env);
    let factory = Address::generate(&env);
    let native = Address::generate(&env);
    let price_wallet = Address::generate(&env);

    let id = env.register(PairlendConfig, ());
    let client = PairlendConfigClient::new(&env, &id);
    client.initialize(&developer, &platform, &factory, &native);
    client.init_parameter(&developer);
    client.set_wallets(
        &developer,
        &vec![&env, Symbol::new(&env, WALLET_PRICE)],
        &vec![&env, price_wallet.clone()],
    );
    Setup {
        env,
        client,
        developer,
        platform,
        factory,
        price_wallet,
    }
}

fn advance(env: &Env, ledgers: u32) {
    env.ledger().with_mut(|li| li.sequence_number += ledgers);
}

#[test]
fn test_init_parameter_defaults() {
    let s = setup();
    let key = |name: &str| Symbol::new(&s.env, name);
    assert_eq!(s.client.get_value(&key(POOL_PLEDGE_RATE)), WAD * 6 / 10);
    assert_eq!(s.client.get_value(&key(POOL_LIQUIDATION_RATE)), WAD * 9 / 10);
    assert_eq!(s.client.get_value(&key(INTEREST_PLATFORM_SHARE)), WAD / 10);
    assert_eq!(s.client.get_value(&key(CHANGE_PRICE_DURATION)), 20);
    assert_eq!(s.client.get_value(&key("UNKNOWN_KEY")), 0);
    assert_eq!(s.client.developer(), s.developer);
    assert_eq!(s.client.mint(), None);
}

#[test]
#[should_panic(expected = "already initialized")]
fn test_initialize_twice_panics() {
    let s = setup();
    let other = Address::generate(&s.env);
    s.client.initialize(&other, &other, &other, &other);
}

#[test]
#[should_panic(expected = "not admin")]
fn test_set_value_requires_developer() {
    let s = setup();
    let stranger = Address::generate(&s.env);
    s.client
        .set_value(&stranger, &Symbol::new(&s.env, POOL_PLEDGE_RATE), &1u128);
}

#[test]
fn test_pool_value_falls_back_to_global() {
    let s = setup();
    let pool = Address::generate(&s.env);
    let rate = Symbol::new(&s.env, POOL_PLEDGE_RATE);
    assert_eq!(s.client.get_pool_value(&pool, &rate), WAD * 6 / 10);

    s.client.set_pool_value(&s.platform, &pool, &rate, &(WAD / 2));
    assert_eq!(s.client.get_pool_value(&pool, &rate), WAD / 2);
    // global untouched
    assert_eq!(s.client.get_value(&rate), WAD * 6 / 10);

    s.client.set_pool_value(&s.factory, &pool, &rate, &(WAD / 3));
    assert_eq!(s.client.get_pool_value(&pool, &rate), WAD / 3);
}

#[test]
#[should_panic(expected = "config forbidden")]
fn test_set_pool_value_forbidden_for_stranger() {
    let s = setup();
    let pool = Address::generate(&s.env);
    let stranger = Address::generate(&s.env);
    s.client.set_pool_value(
        &stranger,
        &pool,
        &Symbol::new(&s.env, POOL_PRICE),
        &WAD,
    );
}

#[test]
fn test_init_pool_params_sets_price_from_tokens() {
    let s = setup();
    let usdt = Address::generate(&s.env);
    let lp = Address::generate(&s.env);
    let pool = Address::generate(&s.env);
    s.client.set_token_price(
        &s.price_wallet,
        &vec![&s.env, usdt.clone(), lp.clone()],
        &vec![&s.env, WAD, WAD / 50],
    );
    s.client.init_pool_params(&s.factory, &pool, &usdt, &lp);

    let price = s
        .client
        .get_pool_value(&pool, &Symbol::new(&s.env, POOL_PRICE));
    assert_eq!(price, WAD / 50);
    assert_eq!(s.client.convert_token_amount(&lp, &usdt, &10_000u128), 200u128);
}

#[test]
#[should_panic(expected = "config forbidden")]
fn test_set_token_price_forbidden_for_developer() {
    let s = setup();
    let token = Address::generate(&s.env);
    s.client
        .set_token_price(&s.developer, &vec![&s.env, token], &vec![&s.env, WAD]);
}

#[test]
#[should_panic(expected = "price duration")]
fn test_pool_price_change_inside_window_panics() {
    let s = setup();
    let pool = Address::generate(&s.env);
    s.client
        .set_pool_price(&s.price_wallet, &vec![&s.env, pool.clone()], &vec![&s.env, WAD]);
    advance(&s.env, 5);
    s.client.set_pool_price(
        &s.price_wallet,
        &vec![&s.env, pool],
        &vec![&s.env, WAD * 11 / 10],
    );
}

#[test]
#[should_panic(expected = "price forbidden")]
fn test_pool_price_jump_panics() {
    let s = setup();
    let pool = Address::generate(&s.env);
    s.client
        .set_pool_price(&s.price_wallet, &vec![&s.env, pool.clone()], &vec![&s.env, WAD]);
    advance(&s.env, 25);
    s.client
        .set_pool_price(&s.price_wallet, &vec![&s.env, pool], &vec![&s.env, WAD / 2]);
}

#[test]
fn test_pool_price_change_within_limits() {
    let s = setup();
    let pool = Address::generate(&s.env);
    s.client
        .set_pool_price(&s.price_wallet, &vec![&s.env, pool.clone()], &vec![&s.env, WAD]);
    advance(&s.env, 20);
    s.client.set_pool_price(
        &s.price_wallet,
        &vec![&s.env, pool.clone()],
        &vec![&s.env, WAD * 12 / 10],
    );
    assert_eq!(
        s.client
            .get_pool_value(&pool, &Symbol::new(&s.env, POOL_PRICE)),
        WAD * 12 / 10
    );

    // developer bypasses the breaker through the pool value path
    s.client.set_pool_value(
        &s.developer,
        &pool,
        &Symbol::new(&s.env, POOL_PRICE),
        &(WAD / 100),
    );
    assert_eq!(
        s.client
            .get_pool_value(&pool, &Symbol::new(&s.env, POOL_PRICE)),
        WAD / 100
    );
}
