//! 网格交易控制器
//!
//! 编排单个交易周期（行情 → 指标 → 风控 → 网格规划 → 对账挂单），
//! 持有交易开关与参数，是前台操作和后台调度共同的入口。

use crate::core::config::BotConfig;
use crate::core::error::StrategyError;
use crate::core::exchange::Exchange;
use crate::strategy::application::risk::{RiskGate, RiskVerdict};
use crate::strategy::application::tasks::{self, SchedulerHandle};
use crate::strategy::domain::engine::GridEngine;
use crate::strategy::domain::indicators::IndicatorEngine;
use crate::strategy::domain::model::{AccountState, IndicatorSnapshot};
use crate::strategy::domain::params::TradingParams;
use crate::strategy::domain::state::TradingState;
use crate::strategy::infrastructure::market::MarketDataGateway;
use crate::strategy::infrastructure::orders::{OrderManager, PlacementReport};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Duration;

/// 单周期执行结果
#[derive(Debug)]
pub enum CycleOutcome {
    /// 交易开关关闭，无操作
    Disabled,
    /// 组合止损触发，两个开关已关闭（停机不是错误）
    Halted,
    /// 周期完整执行
    Completed(PlacementReport),
}

/// 面板快照 - 供外层服务序列化输出
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub current_price: f64,
    pub account: AccountState,
    pub indicators: IndicatorSnapshot,
    pub open_orders: usize,
    pub grid_step: f64,
    pub trading_enabled: bool,
    pub auto_trading_enabled: bool,
    pub params: TradingParams,
}

pub struct TradingController {
    market: MarketDataGateway,
    orders: OrderManager,
    params: RwLock<TradingParams>,
    state: RwLock<TradingState>,
    /// 单槽执行护栏：同一时刻至多一个周期在跑
    cycle_guard: Mutex<()>,
    scheduler: Mutex<Option<SchedulerHandle>>,
}

impl TradingController {
    pub fn new(exchange: Arc<dyn Exchange>, config: &BotConfig) -> Self {
        let market = MarketDataGateway::new(exchange.clone(), &config.strategy);
        let orders = OrderManager::new(exchange, market.clone());

        Self {
            market,
            orders,
            params: RwLock::new(config.params),
            state: RwLock::new(TradingState::default()),
            cycle_guard: Mutex::new(()),
            scheduler: Mutex::new(None),
        }
    }

    /// 执行一个交易周期
    ///
    /// 有周期在执行时立即拒绝（CycleInProgress）。交易所通信类失败
    /// 以周期级错误返回，绝不改动交易开关；止损停机返回成功。
    pub async fn run_cycle(&self) -> Result<CycleOutcome, StrategyError> {
        let _guard = self
            .cycle_guard
            .try_lock()
            .map_err(|_| StrategyError::CycleInProgress)?;

        if !self.state.read().await.trading_enabled {
            return Ok(CycleOutcome::Disabled);
        }

        // 周期内使用统一的参数快照，中途的参数更新对本周期不可见
        let params = *self.params.read().await;

        let series = self.market.price_series().await?;
        let current_price = series
            .last_close()
            .ok_or_else(|| StrategyError::DataUnavailable("收盘价序列为空".to_string()))?;

        let indicators = IndicatorEngine::compute(&series, params.volatility_period)?;
        let account = self.market.account_state(params.initial_capital).await?;

        if RiskGate::evaluate(&account, &params) == RiskVerdict::Halt {
            let mut state = self.state.write().await;
            state.trading_enabled = false;
            state.auto_trading_enabled = false;
            return Ok(CycleOutcome::Halted);
        }

        let plan = GridEngine::build_plan(current_price, &indicators, account.free_balance, &params)?;

        // 无论实际挂出多少单都记录本计划的步长
        self.state.write().await.last_grid_step = plan.grid_step;

        log::info!(
            "📐 网格计划: 价格 {:.4}, 步长 {:.6}, {} 档",
            current_price,
            plan.grid_step,
            plan.levels.len()
        );

        let report = self.orders.reconcile(&plan, &params).await?;
        Ok(CycleOutcome::Completed(report))
    }

    /// 手动开关交易（无条件翻转），返回新值
    pub async fn toggle_trading(&self) -> bool {
        let mut state = self.state.write().await;
        state.trading_enabled = !state.trading_enabled;
        log::info!("🔘 交易开关 → {}", state.trading_enabled);
        state.trading_enabled
    }

    /// 开关自动交易，返回新值
    ///
    /// false→true 时确保有活跃的调度任务：旧循环还在服役则沿用，
    /// 否则拉起新任务；true→false 发送唤醒信号，不打断执行中的周期。
    pub async fn toggle_auto_trading(self: &Arc<Self>) -> bool {
        let mut slot = self.scheduler.lock().await;

        let enabled = {
            let mut state = self.state.write().await;
            state.auto_trading_enabled = !state.auto_trading_enabled;
            state.auto_trading_enabled
        };
        log::info!("🔘 自动交易开关 → {}", enabled);

        if enabled {
            let alive = slot.as_ref().map(|h| !h.is_finished()).unwrap_or(false);
            if !alive {
                *slot = Some(tasks::spawn_auto_trade_task(self.clone()));
            }
        } else if let Some(handle) = slot.as_ref() {
            handle.stop();
        }

        enabled
    }

    /// 原子更新一批交易参数，返回更新后的完整参数
    pub async fn update_parameters(
        &self,
        updates: &HashMap<String, String>,
    ) -> Result<TradingParams, StrategyError> {
        let mut params = self.params.write().await;
        let applied = params.apply_updates(updates)?;
        log::info!("🔧 参数已更新: {:?}", *params);
        Ok(applied)
    }

    /// 生成面板快照
    pub async fn dashboard_snapshot(&self) -> Result<DashboardSnapshot, StrategyError> {
        let params = *self.params.read().await;

        let series = self.market.price_series().await?;
        let current_price = series
            .last_close()
            .ok_or_else(|| StrategyError::DataUnavailable("收盘价序列为空".to_string()))?;
        let indicators = IndicatorEngine::compute(&series, params.volatility_period)?;
        let account = self.market.account_state(params.initial_capital).await?;
        let open_orders = self.orders_count().await?;

        let state = *self.state.read().await;
        Ok(DashboardSnapshot {
            current_price,
            account,
            indicators,
            open_orders,
            grid_step: state.last_grid_step,
            trading_enabled: state.trading_enabled,
            auto_trading_enabled: state.auto_trading_enabled,
            params,
        })
    }

    /// 停止调度并等待后台任务退出（进程收尾用）
    pub async fn shutdown(&self) {
        {
            let mut state = self.state.write().await;
            state.auto_trading_enabled = false;
        }

        let handle = self.scheduler.lock().await.take();
        if let Some(handle) = handle {
            handle.stop();
            let _ = handle.into_join_handle().await;
        }
    }

    pub async fn state(&self) -> TradingState {
        *self.state.read().await
    }

    pub async fn params(&self) -> TradingParams {
        *self.params.read().await
    }

    pub async fn auto_trading_enabled(&self) -> bool {
        self.state.read().await.auto_trading_enabled
    }

    pub async fn auto_trade_interval(&self) -> Duration {
        Duration::from_secs(self.params.read().await.auto_trade_interval_secs)
    }

    /// 是否存在活跃的调度任务
    pub async fn scheduler_active(&self) -> bool {
        self.scheduler
            .lock()
            .await
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    async fn orders_count(&self) -> Result<usize, StrategyError> {
        let orders = self
            .market
            .open_orders()
            .await
            .map_err(StrategyError::Exchange)?;
        Ok(orders.len())
    }

    #[cfg(test)]
    pub(crate) async fn force_auto_trading(&self, enabled: bool) {
        self.state.write().await.auto_trading_enabled = enabled;
    }
}
