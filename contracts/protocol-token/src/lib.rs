#![no_std]
use soroban_sdk::{contract, contractevent, contractimpl, contracttype, Address, Env, String};
use stellar_tokens::fungible::burnable::emit_burn;
use stellar_tokens::fungible::Base as TokenBase;

#[contracttype]
pub enum DataKey {
    Admin,
    MaxSupply,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminChanged {
    #[topic]
    pub new_admin: Address,
}

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

/// Capped SEP-41 token paid out by the emission contract.
#[contract]
pub struct PairlendToken;

#[contractimpl]
impl PairlendToken {
    pub fn initialize(
        env: Env,
        name: String,
        symbol: String,
        decimals: u32,
        admin: Address,
        max_supply: i128,
    ) {
        if env.storage().persistent().has(&DataKey::Admin) {
            panic!("already initialized");
        }
        admin.require_auth();
        if max_supply <= 0 {
            panic!("invalid max supply");
        }
        TokenBase::set_metadata(&env, decimals, name, symbol);
        env.storage().persistent().set(&DataKey::Admin, &admin);
        env.storage()
            .persistent()
            .set(&DataKey::MaxSupply, &max_supply);
        bump_ttl(&env);
    }

    pub fn name(env: Env) -> String {
        TokenBase::name(&env)
    }

    pub fn symbol(env: Env) -> String {
        TokenBase::symbol(&env)
    }

    pub fn decimals(env: Env) -> u32 {
        TokenBase::decimals(&env)
    }

    pub fn total_supply(env: Env) -> i128 {
        TokenBase::total_supply(&env)
    }

    pub fn max_supply(env: Env) -> i128 {
        max_supply(&env)
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        TokenBase::balance(&env, &id)
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        TokenBase::allowance(&env, &owner, &spender)
    }

    pub fn approve(env: Env, owner: Address, spender: Address, amount: i128, live_until_ledger: u32) {
        if amount < 0 {
            panic!("bad amount");
        }
        TokenBase::approve(&env, &owner, &spender, amount, live_until_ledger);
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        if amount <= 0 {
            panic!("bad amount");
        }
        TokenBase::transfer(&env, &from, &to, amount);
    }

    pub fn transfer_from(env: Env, spender: Address, from: Address, to: Address, amount: i128) {
        if amount <= 0 {
            panic!("bad amount");
        }
        TokenBase::transfer_from(&env, &spender, &from, &to, amount);
    }

    pub fn mint(env: Env, to: Address, amount: i128) {
        require_admin(&env);
        if amount <= 0 {
            panic!("bad amount");
        }
        let supply = TokenBase::total_supply(&env);
        if amount > max_supply(&env).saturating_sub(supply) {
            panic!("max supply exceeded");
        }
        TokenBase::mint(&env, &to, amount);
        bump_ttl(&env);
    }

    pub fn burn(env: Env, from: Address, amount: i128) {
        from.require_auth();
        if amount <= 0 {
            panic!("bad amount");
        }
        if TokenBase::balance(&env, &from) < amount {
            panic!("insufficient balance");
        }
        TokenBase::update(&env, Some(&from), None, amount);
        emit_burn(&env, &from, amount);
    }

    pub fn admin(env: Env) -> Address {
        admin(&env)
    }

    pub fn set_admin(env: Env, new_admin: Address) {
        require_admin(&env);
        env.storage().persistent().set(&DataKey::Admin, &new_admin);
        bump_ttl(&env);
        AdminChanged { new_admin }.publish(&env);
    }
}

fn admin(env: &Env) -> Address {
    env.storage()
        .persistent()
        .get(&DataKey::Admin)
        .expect("no admin")
}

fn require_admin(env: &Env) -> Address {
    let admin = admin(env);
    admin.require_auth();
    admin
}

fn max_supply(env: &Env) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::MaxSupply)
        .expect("max supply not set")
}

fn bump_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    let persistent = env.storage().persistent();
    for key in [DataKey::Admin, DataKey::MaxSupply] {
        if persistent.has(&key) {
            persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
    }
}
