#![cfg(test)]

use super::*;
use pairlend_config::{PairlendConfig, PairlendConfigClient, POOL_PRICE, WAD};
use pairlend_pool::{LendingPool, LendingPoolClient};
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{vec, Address, Env, Symbol};

struct Setup<'a> {
    env: Env,
    factory: PairlendFactoryClient<'a>,
    config: PairlendConfigClient<'a>,
    developer: Address,
    platform: Address,
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    let developer = Address::generate(&env);
    let platform = Address::generate(&env);
    let native = Address::generate(&env);

    let factory_id = env.register(PairlendFactory, ());
    let config_id = env.register(PairlendConfig, ());
    let config = PairlendConfigClient::new(&env, &config_id);
    config.initialize(&developer, &platform, &factory_id, &native);
    config.init_parameter(&developer);

    let factory = PairlendFactoryClient::new(&env, &factory_id);
    factory.initialize(&developer, &config_id);

    Setup {
        factory,
        config,
        developer,
        platform,
        env,
    }
}

fn new_pool(env: &Env) -> Address {
    env.register(LendingPool, ())
}

#[test]
fn test_create_pool_indexes_pair() {
    let s = setup();
    let lend = Address::generate(&s.env);
    let collateral = Address::generate(&s.env);
    let pool_id = new_pool(&s.env);

    let created = s
        .factory
        .create_pool(&s.developer, &lend, &collateral, &pool_id);
    assert_eq!(created, pool_id);
    assert_eq!(s.factory.get_pool(&lend, &collateral), Some(pool_id.clone()));
    assert_eq!(s.factory.get_pool(&collateral, &lend), None);
    assert!(s.factory.is_pool(&pool_id));
    assert!(!s.factory.is_pool(&lend));
    assert_eq!(s.factory.all_pools_length(), 1);
    assert_eq!(s.factory.all_pools(&0), pool_id);

    let pool = LendingPoolClient::new(&s.env, &pool_id);
    assert_eq!(pool.lend_token(), lend);
    assert_eq!(pool.collateral_token(), collateral);
}

#[test]
fn test_create_pool_seeds_pool_parameters() {
    let s = setup();
    let price_wallet = Address::generate(&s.env);
    let lend = Address::generate(&s.env);
    let collateral = Address::generate(&s.env);
    s.config.set_wallets(
        &s.developer,
        &vec![&s.env, Symbol::new(&s.env, pairlend_config::WALLET_PRICE)],
        &vec![&s.env, price_wallet.clone()],
    );
    s.config.set_token_price(
        &price_wallet,
        &vec![&s.env, lend.clone(), collateral.clone()],
        &vec![&s.env, WAD, WAD / 50],
    );

    let pool_id = new_pool(&s.env);
    s.factory
        .create_pool(&s.developer, &lend, &collateral, &pool_id);
    assert_eq!(
        s.config
            .get_pool_value(&pool_id, &Symbol::new(&s.env, POOL_PRICE)),
        WAD / 50
    );
}

#[test]
fn test_pools_are_listed_in_creation_order() {
    let s = setup();
    let lend = Address::generate(&s.env);
    let first = new_pool(&s.env);
    let second = new_pool(&s.env);
    s.factory
        .create_pool(&s.developer, &lend, &Address::generate(&s.env), &first);
    s.factory
        .create_pool(&s.developer, &lend, &Address::generate(&s.env), &second);
    assert_eq!(s.factory.all_pools_length(), 2);
    assert_eq!(s.factory.all_pools(&0), first);
    assert_eq!(s.factory.all_pools(&1), second);
}

#[test]
#[should_panic(expected = "pool exists")]
fn test_duplicate_pair_panics() {
    let s = setup();
    let lend = Address::generate(&s.env);
    let collateral = Address::generate(&s.env);
    s.factory
        .create_pool(&s.developer, &lend, &collateral, &new_pool(&s.env));
    s.factory
        .create_pool(&s.developer, &lend, &collateral, &new_pool(&s.env));
}

#[test]
#[should_panic(expected = "not admin")]
fn test_create_pool_requires_developer() {
    let s = setup();
    s.factory.create_pool(
        &s.platform,
        &Address::generate(&s.env),
        &Address::generate(&s.env),
        &new_pool(&s.env),
    );
}

#[test]
#[should_panic(expected = "already initialized")]
fn test_initialize_twice_panics() {
    let s = setup();
    s.factory.initialize(&s.developer, &s.config.address);
}

#[test]
#[should_panic(expected = "pool not found")]
fn test_all_pools_out_of_range_panics() {
    let s = setup();
    s.factory.all_pools(&0);
}

#[test]
#[should_panic(expected = "not admin")]
fn test_initialize_requires_registry_developer() {
    let s = setup();
    let id = s.env.register(PairlendFactory, ());
    PairlendFactoryClient::new(&s.env, &id).initialize(&s.platform, &s.config.address);
}
