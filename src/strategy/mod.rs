pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod testing;

pub use application::controller::{CycleOutcome, DashboardSnapshot, TradingController};
