use soroban_sdk::{contractevent, Address};

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MintFunded {
    #[topic]
    pub developer: Address,
    pub amount: u128,
    pub remaining: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MintSynced {
    pub amount_per_block: u128,
    pub borrow_percent: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProductivityChanged {
    #[topic]
    pub pool: Address,
    #[topic]
    pub user: Address,
    pub borrow_side: bool,
    pub productivity: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Minted {
    #[topic]
    pub pool: Address,
    #[topic]
    pub user: Address,
    pub borrow_side: bool,
    pub user_amount: u128,
    pub team_amount: u128,
    pub spare_amount: u128,
}
