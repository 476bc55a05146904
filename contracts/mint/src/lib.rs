#![no_std]

mod contract;
mod events;
mod storage;

pub use contract::*;
pub use events::*;
pub use storage::{MintState, Position};

#[cfg(test)]
mod test;
