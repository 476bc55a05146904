pub const WAD: u128 = 1_000_000_000_000_000_000u128; // 1e18
pub const LEDGERS_PER_YEAR: u128 = 17_280 * 365; // 5s ledgers

pub const POOL_BASE_INTERESTS: &str = "POOL_BASE_INTERESTS";
pub const POOL_MARKET_FRENZY: &str = "POOL_MARKET_FRENZY";
pub const POOL_PLEDGE_RATE: &str = "POOL_PLEDGE_RATE";
pub const POOL_LIQUIDATION_RATE: &str = "POOL_LIQUIDATION_RATE";
pub const POOL_PRICE: &str = "POOL_PRICE";
pub const INTEREST_PLATFORM_SHARE: &str = "INTEREST_PLATFORM_SHARE";
pub const INTEREST_BUYBACK_SHARE: &str = "INTEREST_BUYBACK_SHARE";

pub const WALLET_TEAM: &str = "team";
pub const WALLET_REWARD: &str = "reward";
