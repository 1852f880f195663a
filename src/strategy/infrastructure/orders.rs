use crate::core::error::ExchangeError;
use crate::core::exchange::Exchange;
use crate::core::types::{Order, Result};
use crate::strategy::domain::model::GridPlan;
use crate::strategy::domain::params::TradingParams;
use crate::strategy::infrastructure::market::MarketDataGateway;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// 超过该时长的挂单视为过期，可在挂单数达到上限时清理
const STALE_ORDER_MAX_AGE_HOURS: i64 = 24;

/// 单周期挂单结果
#[derive(Debug, Default)]
pub struct PlacementReport {
    /// 本周期成功挂出的订单数
    pub placed: usize,
    /// 清理的过期订单数
    pub cancelled_stale: usize,
    /// 挂单失败记录（不重试）
    pub failures: Vec<PlacementFailure>,
    /// 是否命中交易所侧挂单上限并提前终止
    pub order_limit_hit: bool,
    /// 本周期开始挂单时的可用槽位数
    pub available_slots: usize,
}

#[derive(Debug)]
pub struct PlacementFailure {
    pub offset: i32,
    pub price: f64,
    pub error: ExchangeError,
}

/// 订单管理器 - 把期望的网格档位与交易所活跃订单按数量对账
///
/// 对账只基于挂单数量，不比较具体价位；上一周期的档位没有身份延续。
pub struct OrderManager {
    exchange: Arc<dyn Exchange>,
    market: MarketDataGateway,
}

impl OrderManager {
    pub fn new(exchange: Arc<dyn Exchange>, market: MarketDataGateway) -> Self {
        Self { exchange, market }
    }

    /// 执行一轮对账
    ///
    /// 1. 挂单数达到上限时先清理超过24小时的过期订单并重新查询；
    /// 2. 可用槽位 = max_open_orders - 当前挂单数（不为负）；
    /// 3. 按offset升序逐档挂单，槽位用尽或档位耗尽为止；
    /// 4. 单笔失败只记录不重试；命中挂单上限错误则终止本轮。
    pub async fn reconcile(
        &self,
        plan: &GridPlan,
        params: &TradingParams,
    ) -> Result<PlacementReport> {
        let mut report = PlacementReport::default();
        let symbol = self.market.symbol().to_string();

        let mut open_orders = self.market.open_orders().await?;
        if open_orders.len() >= params.max_open_orders {
            report.cancelled_stale = self.cancel_stale_orders(&open_orders).await;
            open_orders = self.market.open_orders().await?;
        }

        let mut slots = params.max_open_orders.saturating_sub(open_orders.len());
        report.available_slots = slots;

        for level in &plan.levels {
            if slots == 0 {
                break;
            }

            match self
                .exchange
                .create_limit_order(&symbol, level.side, level.size, level.price)
                .await
            {
                Ok(order) => {
                    log::info!(
                        "📤 挂单成功 {} {} {:.6} @ {:.4} (id={})",
                        symbol,
                        level.side,
                        level.size,
                        level.price,
                        order.id
                    );
                    report.placed += 1;
                    slots -= 1;
                }
                Err(e) => {
                    log::error!(
                        "❌ 挂单失败 {} 档位{} @ {:.4}: {}",
                        symbol,
                        level.offset,
                        level.price,
                        e
                    );
                    let terminal = e.is_order_limit_reached();
                    report.failures.push(PlacementFailure {
                        offset: level.offset,
                        price: level.price,
                        error: e,
                    });
                    if terminal {
                        log::warn!("⚠️ {} 交易所挂单数已达上限，终止本轮挂单", symbol);
                        report.order_limit_hit = true;
                        break;
                    }
                }
            }
        }

        Ok(report)
    }

    /// 清理过期挂单，返回成功取消的数量
    ///
    /// 单笔取消失败只告警，不影响其余订单。
    async fn cancel_stale_orders(&self, open_orders: &[Order]) -> usize {
        let cutoff = Utc::now() - Duration::hours(STALE_ORDER_MAX_AGE_HOURS);
        let mut cancelled = 0;

        for order in open_orders {
            if order.timestamp >= cutoff {
                continue;
            }
            match self.exchange.cancel_order(&order.id, &order.symbol).await {
                Ok(()) => {
                    log::info!("🗑️ 已清理过期订单 {} ({})", order.id, order.symbol);
                    cancelled += 1;
                }
                Err(e) => {
                    log::warn!("⚠️ 取消过期订单 {} 失败: {}", order.id, e);
                }
            }
        }

        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StrategyConfig;
    use crate::core::types::OrderSide;
    use crate::strategy::domain::model::{GridLevel, GridPlan};
    use crate::strategy::testing::MockExchange;

    fn plan(levels: usize) -> GridPlan {
        let half = levels as i32 / 2;
        let mut grid_levels = Vec::new();
        for offset in -half..=half {
            if offset == 0 {
                continue;
            }
            grid_levels.push(GridLevel {
                offset,
                side: if offset < 0 {
                    OrderSide::Buy
                } else {
                    OrderSide::Sell
                },
                price: 100.0 * (1.0 + offset as f64 * 0.006),
                size: 0.5,
            });
        }
        GridPlan {
            grid_step: 0.006,
            levels: grid_levels,
        }
    }

    fn manager(exchange: Arc<MockExchange>) -> OrderManager {
        let market = MarketDataGateway::new(exchange.clone(), &StrategyConfig::default());
        OrderManager::new(exchange, market)
    }

    #[tokio::test]
    async fn test_reconcile_places_all_levels_with_free_slots() {
        let exchange = Arc::new(MockExchange::new());
        let params = TradingParams::default();

        let report = manager(exchange.clone())
            .reconcile(&plan(4), &params)
            .await
            .unwrap();

        assert_eq!(report.placed, 4);
        assert!(report.failures.is_empty());
        assert!(!report.order_limit_hit);
        assert_eq!(exchange.placed_orders().len(), 4);

        // 买单在卖单之前、低价在前（offset升序）
        let placed = exchange.placed_orders();
        assert_eq!(placed[0].side, OrderSide::Buy);
        assert!(placed[0].price < placed[1].price);
        assert_eq!(placed[3].side, OrderSide::Sell);
    }

    #[tokio::test]
    async fn test_reconcile_respects_available_slots() {
        let exchange = Arc::new(MockExchange::new());
        // 已有8个挂单，上限10 → 只剩2个槽位
        exchange.seed_open_orders(8, Utc::now());
        let params = TradingParams::default();

        let report = manager(exchange.clone())
            .reconcile(&plan(6), &params)
            .await
            .unwrap();

        assert_eq!(report.available_slots, 2);
        assert_eq!(report.placed, 2);
        assert_eq!(exchange.open_order_count(), 10);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent_when_slots_exhausted() {
        let exchange = Arc::new(MockExchange::new());
        exchange.seed_open_orders(10, Utc::now());
        let params = TradingParams::default();
        let mgr = manager(exchange.clone());

        // 没有过期订单可清理，槽位为0 → 不挂任何单
        let report = mgr.reconcile(&plan(4), &params).await.unwrap();
        assert_eq!(report.placed, 0);
        assert_eq!(report.available_slots, 0);

        // 交易所状态未变，重复对账依然不挂单
        let report = mgr.reconcile(&plan(4), &params).await.unwrap();
        assert_eq!(report.placed, 0);
        assert_eq!(exchange.placed_orders().len(), 0);
    }

    #[tokio::test]
    async fn test_stale_orders_cancelled_when_at_limit() {
        let exchange = Arc::new(MockExchange::new());
        // 10个都是25小时前的旧单
        exchange.seed_open_orders(10, Utc::now() - Duration::hours(25));
        let params = TradingParams::default();

        let report = manager(exchange.clone())
            .reconcile(&plan(4), &params)
            .await
            .unwrap();

        assert_eq!(report.cancelled_stale, 10);
        assert_eq!(exchange.cancelled_ids().len(), 10);
        assert_eq!(report.placed, 4);
        assert_eq!(exchange.open_order_count(), 4);
    }

    #[tokio::test]
    async fn test_fresh_orders_survive_cleanup() {
        let exchange = Arc::new(MockExchange::new());
        // 23小时前的订单未过期，清理不动它们
        exchange.seed_open_orders(10, Utc::now() - Duration::hours(23));
        let params = TradingParams::default();

        let report = manager(exchange.clone())
            .reconcile(&plan(4), &params)
            .await
            .unwrap();

        assert_eq!(report.cancelled_stale, 0);
        assert_eq!(report.placed, 0);
        assert_eq!(exchange.open_order_count(), 10);
    }

    #[tokio::test]
    async fn test_per_order_failure_is_recorded_not_retried() {
        let exchange = Arc::new(MockExchange::new());
        exchange.script_place_results(vec![
            Ok(()),
            Err(ExchangeError::OrderError("价格精度错误".to_string())),
            Ok(()),
            Ok(()),
        ]);
        let params = TradingParams::default();

        let report = manager(exchange.clone())
            .reconcile(&plan(4), &params)
            .await
            .unwrap();

        assert_eq!(report.placed, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].offset, -1);
        assert!(!report.order_limit_hit);
    }

    #[tokio::test]
    async fn test_order_limit_error_terminates_pass() {
        let exchange = Arc::new(MockExchange::new());
        exchange.script_place_results(vec![
            Ok(()),
            Err(ExchangeError::ApiError {
                code: -2025,
                message: "Reach max open order limit.".to_string(),
            }),
            Ok(()),
        ]);
        let params = TradingParams::default();

        let report = manager(exchange.clone())
            .reconcile(&plan(6), &params)
            .await
            .unwrap();

        assert_eq!(report.placed, 1);
        assert!(report.order_limit_hit);
        // 终止后不再尝试剩余档位
        assert_eq!(exchange.placed_orders().len(), 1);
    }
}
