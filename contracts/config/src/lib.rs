#![no_std]

mod constants;
mod contract;
mod events;
mod storage;

pub use constants::*;
pub use contract::*;
pub use events::*;

#[cfg(test)]
mod test;
