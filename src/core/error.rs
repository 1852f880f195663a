use thiserror::Error;

/// Binance期货"超出最大挂单数"错误码
const BINANCE_MAX_OPEN_ORDER_CODE: i32 = -2025;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("网络请求错误: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON序列化错误: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("YAML配置错误: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("API错误: {code} - {message}")]
    ApiError { code: i32, message: String },

    #[error("认证错误: {0}")]
    AuthError(String),

    #[error("订单错误: {0}")]
    OrderError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("数据解析错误: {0}")]
    ParseError(String),

    #[error("其他错误: {0}")]
    Other(String),
}

impl ExchangeError {
    /// 判断是否为交易所侧挂单数量达到上限的错误
    ///
    /// Binance期货返回错误码-2025，消息为 "Reach max open order limit"。
    /// 命中该错误时本轮挂单立即终止，但不视为进程级故障。
    pub fn is_order_limit_reached(&self) -> bool {
        match self {
            ExchangeError::ApiError { code, message } => {
                *code == BINANCE_MAX_OPEN_ORDER_CODE
                    || message.contains("Reach max open order limit")
            }
            ExchangeError::OrderError(message) => message.contains("Reach max open order limit"),
            _ => false,
        }
    }
}

/// 策略层错误 - 全部为周期级错误，不会导致进程退出
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("K线数据不足: 需要 {required} 根, 实际 {actual} 根")]
    InsufficientData { required: usize, actual: usize },

    #[error("行情数据不可用: {0}")]
    DataUnavailable(String),

    #[error("无效的参考价格: {0}")]
    InvalidPrice(f64),

    #[error("无效的参数: {key} = {value}")]
    InvalidParameter { key: String, value: String },

    #[error("交易周期正在执行中")]
    CycleInProgress,

    #[error("交易所错误: {0}")]
    Exchange(#[from] ExchangeError),
}
