use crate::core::error::StrategyError;
use crate::strategy::application::controller::{CycleOutcome, TradingController};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// 后台自动交易任务句柄 - 同一时刻至多存在一个活跃实例
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SchedulerHandle {
    /// 唤醒循环立即回到边界检查开关，不打断执行中的周期
    ///
    /// 循环去留由auto_trading_enabled裁决：开关已关则循环退出，
    /// 开关仍开（或被重新打开）则循环继续服役。
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// 取出底层任务句柄用于等待退出
    pub fn into_join_handle(self) -> JoinHandle<()> {
        self.handle
    }
}

/// 启动自动交易循环
///
/// 循环体：执行一个交易周期，吞掉并记录周期级错误，然后休眠配置的
/// 间隔。watch信号只负责唤醒休眠，是否退出由每轮边界处的开关检查
/// 决定，因此周期执行中开关被关了又开时循环不会意外退出。
pub fn spawn_auto_trade_task(controller: Arc<TradingController>) -> SchedulerHandle {
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        log::info!("🚀 自动交易任务启动");

        loop {
            if !controller.auto_trading_enabled().await {
                break;
            }

            match controller.run_cycle().await {
                Ok(CycleOutcome::Completed(report)) => {
                    log::info!(
                        "✅ 自动交易周期完成: 挂单 {} 笔, 失败 {} 笔",
                        report.placed,
                        report.failures.len()
                    );
                }
                Ok(CycleOutcome::Disabled) => {
                    log::debug!("⏭️ 交易开关关闭，跳过本周期");
                }
                Ok(CycleOutcome::Halted) => {
                    log::warn!("🛑 组合止损触发，自动交易停止");
                }
                Err(StrategyError::CycleInProgress) => {
                    log::warn!("⏭️ 上一周期仍在执行，跳过本次调度");
                }
                Err(e) => {
                    // 周期级错误不会终止循环
                    log::error!("❌ 自动交易周期失败: {}", e);
                }
            }

            let interval = controller.auto_trade_interval().await;
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = stop_rx.changed() => {
                    // 信号只用于唤醒，去留由循环顶部的开关检查决定
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        log::info!("🛑 自动交易任务退出");
    });

    SchedulerHandle { stop_tx, handle }
}
