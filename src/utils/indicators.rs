/// 技术指标计算模块
///
/// 纯函数实现，无状态无副作用，数据不足时返回None。
pub mod functions {

    /// 计算简单移动平均线 (SMA)
    pub fn sma(prices: &[f64], period: usize) -> Option<f64> {
        if prices.len() < period || period == 0 {
            return None;
        }

        let sum: f64 = prices[prices.len() - period..].iter().sum();
        Some(sum / period as f64)
    }

    /// 计算相对强弱指数 (RSI)
    pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
        if prices.len() < period + 1 || period == 0 {
            return None;
        }

        let mut gains = 0.0;
        let mut losses = 0.0;

        for i in prices.len() - period..prices.len() {
            let change = prices[i] - prices[i - 1];
            if change > 0.0 {
                gains += change;
            } else {
                losses += change.abs();
            }
        }

        let avg_gain = gains / period as f64;
        let avg_loss = losses / period as f64;

        if avg_loss == 0.0 {
            return Some(100.0);
        }

        let rs = avg_gain / avg_loss;
        Some(100.0 - (100.0 / (1.0 + rs)))
    }

    /// 计算布林带，返回 (上轨, 中轨, 下轨)
    pub fn bollinger_bands(prices: &[f64], period: usize, std_dev: f64) -> Option<(f64, f64, f64)> {
        let sma = sma(prices, period)?;

        let variance: f64 = prices[prices.len() - period..]
            .iter()
            .map(|p| (p - sma).powi(2))
            .sum::<f64>()
            / period as f64;

        let std = variance.sqrt();
        let upper = sma + std_dev * std;
        let lower = sma - std_dev * std;

        Some((upper, sma, lower))
    }

    /// 计算滚动波动率
    ///
    /// 取最近period个百分比涨跌幅的样本标准差（n-1分母）。
    /// 涨跌幅数量不足period时返回None。
    pub fn volatility(prices: &[f64], period: usize) -> Option<f64> {
        if period < 2 || prices.len() < period + 1 {
            return None;
        }

        let changes: Vec<f64> = prices
            .windows(2)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();

        let window = &changes[changes.len() - period..];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|c| (c - mean).powi(2))
            .sum::<f64>()
            / (period - 1) as f64;

        Some(variance.sqrt())
    }
}
