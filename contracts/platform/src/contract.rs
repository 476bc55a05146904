use soroban_sdk::{contract, contractimpl, Address, Env, String, Symbol};

use crate::helpers::*;
use crate::storage::*;

/// Entry point for users. Resolves the pool of a token pair and forwards the call;
/// the pool checks that the platform authorized it.
#[contract]
pub struct PairlendPlatform;

#[contractimpl]
impl PairlendPlatform {
    pub fn initialize(env: Env, developer: Address, config: Address) {
        if env.storage().instance().has(&DataKey::Initialized) {
            panic!("already initialized");
        }
        if let Some(expected) = option_env!("PAIRLEND_INIT_DEVELOPER") {
            let expected = Address::from_string(&String::from_str(&env, expected));
            if developer != expected {
                panic!("unexpected developer");
            }
        }
        if ConfigClient::new(&env, &config).developer() != developer {
            panic!("not admin");
        }
        developer.require_auth();
        env.storage().persistent().set(&DataKey::Config, &config);
        env.storage().instance().set(&DataKey::Initialized, &true);
        bump_core_ttl(&env);
    }

    pub fn deposit(env: Env, user: Address, lend_token: Address, collateral_token: Address, amount: u128) {
        bump_core_ttl(&env);
        user.require_auth();
        get_pool(&env, &lend_token, &collateral_token).deposit(&user, &amount);
    }

    pub fn withdraw(
        env: Env,
        user: Address,
        lend_token: Address,
        collateral_token: Address,
        amount: u128,
    ) -> (u128, u128) {
        bump_core_ttl(&env);
        user.require_auth();
        get_pool(&env, &lend_token, &collateral_token).withdraw(&user, &amount)
    }

    pub fn reinvest(env: Env, user: Address, lend_token: Address, collateral_token: Address) -> u128 {
        bump_core_ttl(&env);
        user.require_auth();
        get_pool(&env, &lend_token, &collateral_token).reinvest(&user)
    }

    pub fn borrow(
        env: Env,
        user: Address,
        lend_token: Address,
        collateral_token: Address,
        amount_collateral: u128,
        expect_borrow: u128,
    ) {
        bump_core_ttl(&env);
        user.require_auth();
        get_pool(&env, &lend_token, &collateral_token).borrow(&user, &amount_collateral, &expect_borrow);
    }

    pub fn repay(
        env: Env,
        user: Address,
        lend_token: Address,
        collateral_token: Address,
        amount_collateral: u128,
        max_repay: u128,
    ) -> (u128, u128) {
        bump_core_ttl(&env);
        user.require_auth();
        get_pool(&env, &lend_token, &collateral_token).repay(&user, &amount_collateral, &max_repay)
    }

    pub fn liquidation(
        env: Env,
        liquidator: Address,
        lend_token: Address,
        collateral_token: Address,
        borrower: Address,
    ) -> u128 {
        bump_core_ttl(&env);
        liquidator.require_auth();
        get_pool(&env, &lend_token, &collateral_token).liquidation(&liquidator, &borrower)
    }

    pub fn claim_collateral(env: Env, user: Address, lend_token: Address, collateral_token: Address) -> u128 {
        bump_core_ttl(&env);
        user.require_auth();
        get_pool(&env, &lend_token, &collateral_token).claim_collateral(&user)
    }

    /// Supply the native asset to the (native, collateral) pool.
    pub fn deposit_native(env: Env, user: Address, collateral_token: Address, amount: u128) {
        bump_core_ttl(&env);
        user.require_auth();
        get_pool(&env, &native_token(&env), &collateral_token).deposit(&user, &amount);
    }

    pub fn withdraw_native(env: Env, user: Address, collateral_token: Address, amount: u128) -> (u128, u128) {
        bump_core_ttl(&env);
        user.require_auth();
        get_pool(&env, &native_token(&env), &collateral_token).withdraw(&user, &amount)
    }

    /// Pledge the native asset in the (lend, native) pool.
    pub fn borrow_with_native(
        env: Env,
        user: Address,
        lend_token: Address,
        amount_collateral: u128,
        expect_borrow: u128,
    ) {
        bump_core_ttl(&env);
        user.require_auth();
        get_pool(&env, &lend_token, &native_token(&env)).borrow(&user, &amount_collateral, &expect_borrow);
    }

    /// Repay a native-asset loan of the (native, collateral) pool.
    pub fn repay_native(
        env: Env,
        user: Address,
        collateral_token: Address,
        amount_collateral: u128,
        max_repay: u128,
    ) -> (u128, u128) {
        bump_core_ttl(&env);
        user.require_auth();
        get_pool(&env, &native_token(&env), &collateral_token).repay(&user, &amount_collateral, &max_repay)
    }

    pub fn get_maximum_borrow_amount(
        env: Env,
        lend_token: Address,
        collateral_token: Address,
        amount_collateral: u128,
    ) -> u128 {
        get_pool(&env, &lend_token, &collateral_token).get_maximum_borrow_amount(&amount_collateral)
    }

    pub fn get_repay_amount(
        env: Env,
        lend_token: Address,
        collateral_token: Address,
        amount_collateral: u128,
        user: Address,
    ) -> u128 {
        get_pool(&env, &lend_token, &collateral_token).get_repay_amount(&amount_collateral, &user)
    }

    pub fn get_interests(env: Env, lend_token: Address, collateral_token: Address) -> u128 {
        get_pool(&env, &lend_token, &collateral_token).get_interests()
    }

    pub fn switch_strategy(
        env: Env,
        developer: Address,
        lend_token: Address,
        collateral_token: Address,
        strategy: Option<Address>,
    ) {
        bump_core_ttl(&env);
        require_developer(&env, &developer);
        get_pool(&env, &lend_token, &collateral_token).switch_strategy(&strategy);
    }

    /// Tune one pool without touching the registry-wide default. Price changes made
    /// here skip the price wallet's duration and percentage limits.
    pub fn update_pool_parameter(
        env: Env,
        developer: Address,
        lend_token: Address,
        collateral_token: Address,
        key: Symbol,
        value: u128,
    ) {
        bump_core_ttl(&env);
        require_developer(&env, &developer);
        let pool = get_pool(&env, &lend_token, &collateral_token);
        config(&env).set_pool_value(&env.current_contract_address(), &pool.address, &key, &value);
    }

    pub fn config(env: Env) -> Address {
        config(&env).address
    }
}
