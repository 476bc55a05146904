pub const WAD: u128 = 1_000_000_000_000_000_000u128; // 1e18
pub const BPS: u128 = 10_000u128;

// Parameter keys. Symbols are limited to 32 chars of [a-zA-Z0-9_].
pub const POOL_BASE_INTERESTS: &str = "POOL_BASE_INTERESTS";
pub const POOL_MARKET_FRENZY: &str = "POOL_MARKET_FRENZY";
pub const POOL_PLEDGE_RATE: &str = "POOL_PLEDGE_RATE";
pub const POOL_LIQUIDATION_RATE: &str = "POOL_LIQUIDATION_RATE";
pub const POOL_MINT_POWER: &str = "POOL_MINT_POWER";
pub const POOL_PRICE: &str = "POOL_PRICE";
pub const INTEREST_PLATFORM_SHARE: &str = "INTEREST_PLATFORM_SHARE";
pub const INTEREST_BUYBACK_SHARE: &str = "INTEREST_BUYBACK_SHARE";
pub const CHANGE_PRICE_DURATION: &str = "CHANGE_PRICE_DURATION";
pub const CHANGE_PRICE_PERCENT: &str = "CHANGE_PRICE_PERCENT";
pub const MINT_AMOUNT_PER_BLOCK: &str = "MINT_AMOUNT_PER_BLOCK";
pub const MINT_BORROW_PERCENT: &str = "MINT_BORROW_PERCENT";
pub const MINT_TEAM_SHARE: &str = "MINT_TEAM_SHARE";
pub const MINT_SPARE_SHARE: &str = "MINT_SPARE_SHARE";

// Wallet names.
pub const WALLET_TEAM: &str = "team";
pub const WALLET_SPARE: &str = "spare";
pub const WALLET_REWARD: &str = "reward";
pub const WALLET_PRICE: &str = "price";

/// Keys copied into a pool when it is created; the pool can then be tuned on its own.
pub const POOL_PARAMS: [&str; 5] = [
    POOL_BASE_INTERESTS,
    POOL_MARKET_FRENZY,
    POOL_PLEDGE_RATE,
    POOL_LIQUIDATION_RATE,
    POOL_MINT_POWER,
];

/// Defaults written by `init_parameter`.
pub const DEFAULT_PARAMS: [(&str, u128); 13] = [
    (POOL_BASE_INTERESTS, WAD / 5),
    (POOL_MARKET_FRENZY, WAD / 5),
    (POOL_PLEDGE_RATE, WAD * 6 / 10),
    (POOL_LIQUIDATION_RATE, WAD * 9 / 10),
    (POOL_MINT_POWER, BPS),
    (INTEREST_PLATFORM_SHARE, WAD / 10),
    (INTEREST_BUYBACK_SHARE, WAD / 2),
    (CHANGE_PRICE_DURATION, 20),
    (CHANGE_PRICE_PERCENT, 20),
    (MINT_AMOUNT_PER_BLOCK, 0),
    (MINT_BORROW_PERCENT, 5_000),
    (MINT_TEAM_SHARE, WAD / 10),
    (MINT_SPARE_SHARE, WAD / 20),
];
