#![no_std]

mod constants;
mod contract;
mod events;
mod helpers;
mod storage;

pub use constants::*;
pub use contract::*;
pub use events::*;
pub use storage::{Borrow, LiquidationRecord, PoolState, Supply};
