use crate::core::types::OrderSide;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 收盘价序列 - 每周期一次性拉取的不可变快照，最新的在末尾
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub closes: Vec<f64>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// 最新收盘价（当前价格）
    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }
}

/// 单周期指标快照，仅在该周期内有效
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IndicatorSnapshot {
    pub sma: f64,
    pub rsi: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub volatility: f64,
}

/// 账户状态，按周期派生
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AccountState {
    pub total_balance: f64,
    pub free_balance: f64,
    pub pnl: f64,
}

/// 单个网格档位
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GridLevel {
    /// 相对当前价的偏移档数，不为0，负数在下方
    pub offset: i32,
    pub side: OrderSide,
    pub price: f64,
    pub size: f64,
}

/// 网格下单计划 - 每周期重新生成，不与上一周期比对
#[derive(Debug, Clone, Serialize)]
pub struct GridPlan {
    pub grid_step: f64,
    /// 按offset升序排列
    pub levels: Vec<GridLevel>,
}
