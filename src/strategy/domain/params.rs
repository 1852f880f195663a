use crate::core::error::StrategyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 网格档位数上限，避免失控的巨型网格
const MAX_GRID_NUMBER: u32 = 100;

/// 交易参数 - 运行时可整体原子更新
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingParams {
    /// 初始资金（计价资产）
    pub initial_capital: f64,
    /// 网格档位总数，偶数，上下各一半
    pub grid_number: u32,
    /// 波动率滚动窗口（涨跌幅数量）
    pub volatility_period: usize,
    /// 单档最大名义金额
    pub max_position_size: f64,
    /// 止损阈值，占初始资金的比例，(0, 1]
    pub stop_loss_threshold: f64,
    /// 交易所侧最大挂单数量
    pub max_open_orders: usize,
    /// 自动交易周期间隔（秒）
    pub auto_trade_interval_secs: u64,
}

impl Default for TradingParams {
    fn default() -> Self {
        Self {
            initial_capital: 500.0,
            grid_number: 4,
            volatility_period: 10,
            max_position_size: 275.0,
            stop_loss_threshold: 0.85,
            max_open_orders: 10,
            auto_trade_interval_secs: 60,
        }
    }
}

impl TradingParams {
    /// 校验参数内部一致性
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.grid_number < 2 || self.grid_number % 2 != 0 || self.grid_number > MAX_GRID_NUMBER {
            return Err(invalid("GRID_NUMBER", self.grid_number));
        }
        if self.volatility_period < 2 {
            return Err(invalid("VOLATILITY_PERIOD", self.volatility_period));
        }
        if !(self.stop_loss_threshold > 0.0 && self.stop_loss_threshold <= 1.0) {
            return Err(invalid("STOP_LOSS_THRESHOLD", self.stop_loss_threshold));
        }
        if self.initial_capital <= 0.0 {
            return Err(invalid("INITIAL_CAPITAL", self.initial_capital));
        }
        if self.max_position_size <= 0.0 {
            return Err(invalid("MAX_POSITION_SIZE", self.max_position_size));
        }
        if self.max_open_orders == 0 {
            return Err(invalid("MAX_OPEN_ORDERS", self.max_open_orders));
        }
        if self.auto_trade_interval_secs == 0 {
            return Err(invalid("AUTO_TRADE_INTERVAL", self.auto_trade_interval_secs));
        }
        Ok(())
    }

    /// 应用一批键值更新，返回更新后的参数
    ///
    /// 全有或全无：先解析并校验全部已识别的键，任一解析失败或校验
    /// 不通过则整批放弃，self保持不变。未识别的键直接忽略。
    pub fn apply_updates(
        &mut self,
        updates: &HashMap<String, String>,
    ) -> Result<Self, StrategyError> {
        let mut staged = *self;

        for (key, value) in updates {
            match key.as_str() {
                "INITIAL_CAPITAL" => staged.initial_capital = parse_f64(key, value)?,
                "GRID_NUMBER" => staged.grid_number = parse_int(key, value)?,
                "VOLATILITY_PERIOD" => staged.volatility_period = parse_int(key, value)?,
                "MAX_POSITION_SIZE" => staged.max_position_size = parse_f64(key, value)?,
                "STOP_LOSS_THRESHOLD" => staged.stop_loss_threshold = parse_f64(key, value)?,
                "MAX_OPEN_ORDERS" => staged.max_open_orders = parse_int(key, value)?,
                "AUTO_TRADE_INTERVAL" => {
                    staged.auto_trade_interval_secs = parse_int(key, value)?
                }
                _ => {
                    log::debug!("忽略未识别的参数键: {}", key);
                }
            }
        }

        staged.validate()?;
        *self = staged;
        Ok(staged)
    }
}

fn parse_f64(key: &str, value: &str) -> Result<f64, StrategyError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| StrategyError::InvalidParameter {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// 计数类参数必须是不带小数的非负整数，"6.9"之类直接拒绝
fn parse_int<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, StrategyError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| StrategyError::InvalidParameter {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn invalid<V: std::fmt::Display>(key: &str, value: V) -> StrategyError {
    StrategyError::InvalidParameter {
        key: key.to_string(),
        value: value.to_string(),
    }
}
