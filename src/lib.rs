pub mod core;
pub mod exchanges;
pub mod strategy;
pub mod utils;

// 选择性导出，避免命名冲突
pub use crate::core::{config::*, error::*, exchange::Exchange, types::*};
pub use crate::exchanges::BinanceFutures;
pub use crate::strategy::{CycleOutcome, DashboardSnapshot, TradingController};
