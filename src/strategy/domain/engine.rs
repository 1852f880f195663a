//! 网格核心算法模块
//!
//! 纯算法：步长计算、行情状态调节、档位规划，不持有任何锁和IO。

use crate::core::error::StrategyError;
use crate::core::types::OrderSide;
use crate::strategy::domain::model::{GridLevel, GridPlan, IndicatorSnapshot};
use crate::strategy::domain::params::TradingParams;

/// 基础网格步长率
pub const BASE_STEP_RATE: f64 = 0.006;

/// 可用余额中用于单档下单的比例
const FREE_BALANCE_RATIO: f64 = 0.15;

/// 行情状态 - 每周期判定一次，三个分支互斥
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridRegime {
    /// 跌破下轨且超卖，收窄网格偏向吸筹
    OversoldBreakdown,
    /// 突破上轨且超买，放宽网格偏向派发
    OverboughtBreakout,
    Neutral,
}

impl GridRegime {
    /// 对应的步长乘数
    pub fn step_multiplier(&self) -> f64 {
        match self {
            GridRegime::OversoldBreakdown => 0.8,
            GridRegime::OverboughtBreakout => 1.2,
            GridRegime::Neutral => 1.0,
        }
    }
}

pub struct GridEngine;

impl GridEngine {
    /// 基础步长 = BASE_STEP_RATE × (1 + 波动率)
    pub fn base_grid_step(volatility: f64) -> f64 {
        BASE_STEP_RATE * (1.0 + volatility)
    }

    /// 判定行情状态，优先级：超卖 > 超买 > 中性
    pub fn classify_regime(current_price: f64, indicators: &IndicatorSnapshot) -> GridRegime {
        if current_price < indicators.bb_lower && indicators.rsi < 30.0 {
            GridRegime::OversoldBreakdown
        } else if current_price > indicators.bb_upper && indicators.rsi > 70.0 {
            GridRegime::OverboughtBreakout
        } else {
            GridRegime::Neutral
        }
    }

    /// 单档下单数量 = min(可用余额 × 0.15, 单档最大名义金额 / 当前价)
    ///
    /// 计划内所有档位使用相同数量。
    pub fn position_size(current_price: f64, free_balance: f64, params: &TradingParams) -> f64 {
        (free_balance * FREE_BALANCE_RATIO).min(params.max_position_size / current_price)
    }

    /// 生成网格计划
    ///
    /// 档位偏移取 [-n/2, n/2] 去掉0，按升序排列；价格 = 当前价 × (1 + 偏移 × 步长)，
    /// 下方挂买单上方挂卖单。每周期从零生成，不继承上一周期的档位。
    pub fn build_plan(
        current_price: f64,
        indicators: &IndicatorSnapshot,
        free_balance: f64,
        params: &TradingParams,
    ) -> Result<GridPlan, StrategyError> {
        if current_price <= 0.0 {
            return Err(StrategyError::InvalidPrice(current_price));
        }

        let regime = Self::classify_regime(current_price, indicators);
        let grid_step =
            Self::base_grid_step(indicators.volatility) * regime.step_multiplier();
        let size = Self::position_size(current_price, free_balance, params);

        let half = params.grid_number as i32 / 2;
        let mut levels = Vec::with_capacity(params.grid_number as usize);
        for offset in -half..=half {
            if offset == 0 {
                continue;
            }
            let side = if offset < 0 {
                OrderSide::Buy
            } else {
                OrderSide::Sell
            };
            levels.push(GridLevel {
                offset,
                side,
                price: current_price * (1.0 + offset as f64 * grid_step),
                size,
            });
        }

        Ok(GridPlan { grid_step, levels })
    }
}
