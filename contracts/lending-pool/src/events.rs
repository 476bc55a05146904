use soroban_sdk::{contractevent, Address, Symbol};

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    #[topic]
    pub user: Address,
    pub amount: u128,
    pub amount_supply: u128,
    pub remain_supply: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdraw {
    #[topic]
    pub user: Address,
    pub amount: u128,
    pub lend_paid: u128,
    pub collateral_paid: u128,
    pub platform_share: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reinvest {
    #[topic]
    pub user: Address,
    pub reinvested: u128,
    pub platform_share: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BorrowEvent {
    #[topic]
    pub user: Address,
    pub amount_collateral: u128,
    pub borrow_amount: u128,
    pub account_borrows: u128,
    pub total_borrows: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Repay {
    #[topic]
    pub user: Address,
    pub amount_collateral: u128,
    pub repay_amount: u128,
    pub repay_interest: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Liquidation {
    #[topic]
    pub liquidator: Address,
    #[topic]
    pub user: Address,
    pub amount_collateral: u128,
    pub expected_repay: u128,
}

/// Emitted once per accrual step that moved the accumulators.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterestAccrued {
    pub interest_per_supply: u128,
    pub interest_per_borrow: u128,
    pub total_borrow: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlatformShareDistributed {
    #[topic]
    pub team: Address,
    #[topic]
    pub reward: Address,
    pub team_amount: u128,
    pub reward_amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategySwitched {
    pub old_strategy: Option<Address>,
    pub new_strategy: Option<Address>,
    pub migrated: u128,
}

/// Liquidated collateral the strategy could not release; claimable later.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollateralDeferred {
    #[topic]
    pub user: Address,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollateralClaimed {
    #[topic]
    pub user: Address,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExternalCallFailed {
    #[topic]
    pub contract: Address,
    pub function: Symbol,
    pub recoverable: bool,
    pub failure_kind: u32,
}
