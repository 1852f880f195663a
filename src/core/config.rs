use crate::core::error::ExchangeError;
use crate::strategy::domain::params::TradingParams;
use serde::{Deserialize, Serialize};
use std::fs;

/// 策略运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    /// 交易对（Binance期货格式，如 BTCUSDT）
    pub symbol: String,
    /// K线周期
    pub interval: String,
    /// 每周期拉取的K线数量
    pub kline_limit: u32,
    /// 计价资产
    pub quote_asset: String,
    pub log_level: String,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            name: "grid".to_string(),
            symbol: "BTCUSDT".to_string(),
            interval: "1h".to_string(),
            kline_limit: 100,
            quote_asset: "USDT".to_string(),
            log_level: "INFO".to_string(),
        }
    }
}

/// 机器人总配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub params: TradingParams,
}

impl BotConfig {
    /// 从YAML文件加载配置
    pub fn from_file(path: &str) -> Result<Self, ExchangeError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ExchangeError::ConfigError(format!("读取配置文件 {} 失败: {}", path, e)))?;

        let config: BotConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

/// API密钥
#[derive(Debug, Clone)]
pub struct ApiKeys {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiKeys {
    /// 从环境变量加载API密钥（BINANCE_API_KEY / BINANCE_SECRET_KEY）
    pub fn from_env(prefix: &str) -> Result<Self, ExchangeError> {
        dotenv::dotenv().ok(); // 加载.env文件，忽略错误

        let key_var = format!("{}_API_KEY", prefix);
        let secret_var = format!("{}_SECRET_KEY", prefix);

        let api_key = std::env::var(&key_var)
            .map_err(|_| ExchangeError::AuthError(format!("环境变量 {} 未设置", key_var)))?;
        let api_secret = std::env::var(&secret_var)
            .map_err(|_| ExchangeError::AuthError(format!("环境变量 {} 未设置", secret_var)))?;

        Ok(Self {
            api_key,
            api_secret,
        })
    }
}
