use soroban_sdk::{contractevent, Address, Symbol};

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParameterChanged {
    #[topic]
    pub key: Symbol,
    pub value: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolParameterChanged {
    #[topic]
    pub pool: Address,
    #[topic]
    pub key: Symbol,
    pub value: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WalletChanged {
    #[topic]
    pub name: Symbol,
    pub wallet: Address,
}

/// Emitted for token prices and pool prices alike; `target` is the token or the pool.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceChanged {
    #[topic]
    pub target: Address,
    pub old_price: u128,
    pub new_price: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewDeveloper {
    #[topic]
    pub developer: Address,
}
