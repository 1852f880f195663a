use crate::strategy::domain::model::AccountState;
use crate::strategy::domain::params::TradingParams;

/// 风险评估结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskVerdict {
    Continue,
    /// 组合止损触发，调用方必须在返回前持久化关闭两个开关
    Halt,
}

/// 风险闸门 - 组合级止损判定
///
/// 触发后的停机在本周期内单向生效，恢复交易只能由外部显式操作完成。
pub struct RiskGate;

impl RiskGate {
    /// Halt当且仅当 总余额 < 初始资金 × 止损阈值
    pub fn evaluate(account: &AccountState, params: &TradingParams) -> RiskVerdict {
        let floor = params.initial_capital * params.stop_loss_threshold;
        if account.total_balance < floor {
            log::error!(
                "❌ 触发组合止损: 总余额 {:.2} < 止损线 {:.2} (初始资金 {:.2} × 阈值 {:.2})",
                account.total_balance,
                floor,
                params.initial_capital,
                params.stop_loss_threshold
            );
            RiskVerdict::Halt
        } else {
            RiskVerdict::Continue
        }
    }
}
