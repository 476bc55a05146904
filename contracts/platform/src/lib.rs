#![no_std]

mod constants;
mod contract;
mod helpers;
mod storage;

pub use contract::*;
