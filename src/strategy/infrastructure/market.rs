use crate::core::config::StrategyConfig;
use crate::core::error::StrategyError;
use crate::core::exchange::Exchange;
use crate::core::types::Order;
use crate::strategy::domain::model::{AccountState, PriceSeries};
use std::sync::Arc;

/// 行情网关 - 把交易所查询包装成策略层的类型化结果
#[derive(Clone)]
pub struct MarketDataGateway {
    exchange: Arc<dyn Exchange>,
    symbol: String,
    interval: String,
    kline_limit: u32,
    quote_asset: String,
}

impl MarketDataGateway {
    pub fn new(exchange: Arc<dyn Exchange>, config: &StrategyConfig) -> Self {
        Self {
            exchange,
            symbol: config.symbol.clone(),
            interval: config.interval.clone(),
            kline_limit: config.kline_limit,
            quote_asset: config.quote_asset.clone(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// 拉取收盘价序列快照，失败或为空时报DataUnavailable
    pub async fn price_series(&self) -> Result<PriceSeries, StrategyError> {
        let klines = self
            .exchange
            .get_klines(&self.symbol, &self.interval, self.kline_limit)
            .await
            .map_err(|e| StrategyError::DataUnavailable(e.to_string()))?;

        if klines.is_empty() {
            return Err(StrategyError::DataUnavailable(format!(
                "{} 未返回任何K线",
                self.symbol
            )));
        }

        let mut timestamps = Vec::with_capacity(klines.len());
        let mut closes = Vec::with_capacity(klines.len());
        for kline in klines {
            timestamps.push(kline.open_time);
            closes.push(kline.close);
        }

        Ok(PriceSeries { timestamps, closes })
    }

    /// 拉取账户状态，pnl = 总余额 - 初始资金
    pub async fn account_state(&self, initial_capital: f64) -> Result<AccountState, StrategyError> {
        let balance = self
            .exchange
            .get_balance(&self.quote_asset)
            .await
            .map_err(|e| StrategyError::DataUnavailable(e.to_string()))?;

        Ok(AccountState {
            total_balance: balance.total,
            free_balance: balance.free,
            pnl: balance.total - initial_capital,
        })
    }

    /// 查询当前活跃订单
    pub async fn open_orders(&self) -> crate::core::types::Result<Vec<Order>> {
        self.exchange.get_open_orders(&self.symbol).await
    }
}
