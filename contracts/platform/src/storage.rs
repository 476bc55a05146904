use soroban_sdk::{contracttype, Address, Env, Symbol};

#[soroban_sdk::contractclient(name = "ConfigClient")]
pub trait ConfigContract {
    fn developer(env: Env) -> Address;
    fn factory(env: Env) -> Address;
    fn native_token(env: Env) -> Address;
    fn set_pool_value(env: Env, caller: Address, pool: Address, key: Symbol, value: u128);
}

#[soroban_sdk::contractclient(name = "FactoryClient")]
pub trait FactoryContract {
    fn get_pool(env: Env, lend_token: Address, collateral_token: Address) -> Option<Address>;
}

#[soroban_sdk::contractclient(name = "PoolClient")]
pub trait PoolContract {
    fn deposit(env: Env, user: Address, amount: u128);
    fn withdraw(env: Env, user: Address, amount: u128) -> (u128, u128);
    fn reinvest(env: Env, user: Address) -> u128;
    fn borrow(env: Env, user: Address, amount_collateral: u128, expect_borrow: u128);
    fn repay(env: Env, user: Address, amount_collateral: u128, max_repay: u128) -> (u128, u128);
    fn liquidation(env: Env, liquidator: Address, user: Address) -> u128;
    fn switch_strategy(env: Env, new_strategy: Option<Address>);
    fn claim_collateral(env: Env, user: Address) -> u128;
    fn get_maximum_borrow_amount(env: Env, amount_collateral: u128) -> u128;
    fn get_repay_amount(env: Env, amount_collateral: u128, user: Address) -> u128;
    fn get_interests(env: Env) -> u128;
}

#[contracttype]
pub enum DataKey {
    Initialized,
    Config,
}
