use crate::core::error::StrategyError;
use crate::strategy::domain::model::{IndicatorSnapshot, PriceSeries};
use crate::utils::indicators::functions;

const SMA_WINDOW: usize = 20;
const RSI_WINDOW: usize = 14;
const BOLL_WINDOW: usize = 20;
const BOLL_STD_DEV: f64 = 2.0;

/// 指标引擎 - 输入价格序列的纯函数，每周期计算一次快照
pub struct IndicatorEngine;

impl IndicatorEngine {
    /// 序列长度需求（含波动率窗口）
    fn required_len(volatility_period: usize) -> usize {
        SMA_WINDOW
            .max(RSI_WINDOW + 1)
            .max(BOLL_WINDOW)
            .max(volatility_period + 1)
    }

    /// 计算指标快照
    pub fn compute(
        series: &PriceSeries,
        volatility_period: usize,
    ) -> Result<IndicatorSnapshot, StrategyError> {
        let required = Self::required_len(volatility_period);
        if series.len() < required {
            return Err(StrategyError::InsufficientData {
                required,
                actual: series.len(),
            });
        }

        let closes = &series.closes;
        let actual = closes.len();

        let sma = functions::sma(closes, SMA_WINDOW)
            .ok_or(StrategyError::InsufficientData { required, actual })?;
        let rsi = functions::rsi(closes, RSI_WINDOW)
            .ok_or(StrategyError::InsufficientData { required, actual })?;
        let (bb_upper, bb_middle, bb_lower) =
            functions::bollinger_bands(closes, BOLL_WINDOW, BOLL_STD_DEV)
                .ok_or(StrategyError::InsufficientData { required, actual })?;
        let volatility = functions::volatility(closes, volatility_period)
            .ok_or(StrategyError::InsufficientData { required, actual })?;

        Ok(IndicatorSnapshot {
            sma,
            rsi,
            bb_upper,
            bb_middle,
            bb_lower,
            volatility,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn series(closes: Vec<f64>) -> PriceSeries {
        PriceSeries {
            timestamps: vec![Utc::now(); closes.len()],
            closes,
        }
    }

    #[test]
    fn test_compute_full_snapshot() {
        // 100根带小幅波动的K线
        let closes: Vec<f64> = (0..100)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 2.0)
            .collect();
        let snapshot = IndicatorEngine::compute(&series(closes), 10).unwrap();

        assert!(snapshot.bb_upper > snapshot.bb_middle);
        assert!(snapshot.bb_middle > snapshot.bb_lower);
        assert!(snapshot.rsi >= 0.0 && snapshot.rsi <= 100.0);
        assert!(snapshot.volatility > 0.0);
    }

    #[test]
    fn test_short_series_fails() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let result = IndicatorEngine::compute(&series(closes), 10);
        assert!(matches!(
            result,
            Err(StrategyError::InsufficientData { actual: 15, .. })
        ));
    }

    #[test]
    fn test_long_volatility_window_raises_requirement() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        // 指标窗口够了，但50期波动率需要51根
        let result = IndicatorEngine::compute(&series(closes), 50);
        assert!(matches!(
            result,
            Err(StrategyError::InsufficientData { required: 51, .. })
        ));
    }
}
