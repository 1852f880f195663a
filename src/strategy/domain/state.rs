use serde::Serialize;

/// 策略运行状态 - 进程生命周期内有效，仅重启时重置
///
/// 由控制器持有，所有读写都经过同一把锁。
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TradingState {
    pub trading_enabled: bool,
    pub auto_trading_enabled: bool,
    /// 最近一次计划使用的网格步长
    pub last_grid_step: f64,
}

impl Default for TradingState {
    fn default() -> Self {
        Self {
            trading_enabled: true,
            auto_trading_enabled: false,
            last_grid_step: 0.0,
        }
    }
}
