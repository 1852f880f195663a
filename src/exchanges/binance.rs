//! Binance USDT本位期货交易所实现
//!
//! 只覆盖网格策略所需的接口：K线、余额、挂单查询、限价单下撤。

use crate::core::config::ApiKeys;
use crate::core::error::ExchangeError;
use crate::core::exchange::Exchange;
use crate::core::types::{Balance, Kline, Order, OrderSide, OrderStatus, Result};
use crate::utils::generate_order_id_with_tag;
use crate::utils::signature::SignatureHelper;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

const FUTURES_BASE_URL: &str = "https://fapi.binance.com";
const RECV_WINDOW_MS: &str = "60000";

/// 币安期货交易所
pub struct BinanceFutures {
    client: reqwest::Client,
    api_keys: ApiKeys,
    base_url: String,
}

impl BinanceFutures {
    /// 创建币安期货交易所实例
    pub fn new(api_keys: ApiKeys) -> Self {
        Self::with_base_url(api_keys, FUTURES_BASE_URL.to_string())
    }

    /// 指定base_url创建实例（测试网等）
    pub fn with_base_url(api_keys: ApiKeys, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_keys,
            base_url,
        }
    }

    /// 将HTTP错误响应转换为ApiError
    ///
    /// Binance错误体格式: {"code": -2025, "msg": "Reach max open order limit."}
    async fn parse_error_response(response: reqwest::Response) -> ExchangeError {
        let status_code = response.status().as_u16() as i32;
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "未知错误".to_string());

        #[derive(Deserialize)]
        struct BinanceError {
            code: i32,
            msg: String,
        }

        match serde_json::from_str::<BinanceError>(&error_text) {
            Ok(err) => ExchangeError::ApiError {
                code: err.code,
                message: err.msg,
            },
            Err(_) => ExchangeError::ApiError {
                code: status_code,
                message: error_text,
            },
        }
    }

    /// 发送公共接口请求
    async fn send_public_request<T>(
        &self,
        endpoint: &str,
        params: HashMap<String, String>,
    ) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        let url = format!("{}{}?{}", self.base_url, endpoint, query.join("&"));

        let response = self.client.get(&url).send().await?;

        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(Self::parse_error_response(response).await)
        }
    }

    /// 发送签名请求
    async fn send_signed_request<T>(
        &self,
        method: &str,
        endpoint: &str,
        mut params: HashMap<String, String>,
    ) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let timestamp = Utc::now().timestamp_millis().to_string();
        params.insert("timestamp".to_string(), timestamp);
        params.insert("recvWindow".to_string(), RECV_WINDOW_MS.to_string());

        // 按字母顺序排序参数以生成签名
        let mut sorted_params: Vec<(&String, &String)> = params.iter().collect();
        sorted_params.sort_by_key(|&(k, _)| k);

        let query_string = sorted_params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<String>>()
            .join("&");

        let signature =
            SignatureHelper::binance_signature(&self.api_keys.api_secret, &query_string);
        let url = format!(
            "{}{}?{}&signature={}",
            self.base_url, endpoint, query_string, signature
        );

        let request = match method {
            "GET" => self.client.get(&url),
            "POST" => self.client.post(&url),
            "DELETE" => self.client.delete(&url),
            _ => return Err(ExchangeError::Other(format!("不支持的HTTP方法: {}", method))),
        };

        let response = request
            .header("X-MBX-APIKEY", &self.api_keys.api_key)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(Self::parse_error_response(response).await)
        }
    }
}

/// Binance订单响应
#[derive(Debug, Deserialize)]
struct BinanceOrder {
    #[serde(rename = "orderId")]
    order_id: u64,
    symbol: String,
    side: String,
    price: String,
    #[serde(rename = "origQty")]
    orig_qty: String,
    status: String,
    /// openOrders返回time，下单响应返回updateTime
    #[serde(default)]
    time: Option<i64>,
    #[serde(rename = "updateTime", default)]
    update_time: Option<i64>,
}

impl BinanceOrder {
    fn into_order(self) -> Result<Order> {
        let side = match self.side.as_str() {
            "BUY" => OrderSide::Buy,
            "SELL" => OrderSide::Sell,
            other => {
                return Err(ExchangeError::ParseError(format!(
                    "未知的订单方向: {}",
                    other
                )))
            }
        };

        let status = match self.status.as_str() {
            "NEW" => OrderStatus::Open,
            "PARTIALLY_FILLED" => OrderStatus::PartiallyFilled,
            "FILLED" => OrderStatus::Filled,
            "CANCELED" => OrderStatus::Canceled,
            "REJECTED" => OrderStatus::Rejected,
            "EXPIRED" | "EXPIRED_IN_MATCH" => OrderStatus::Expired,
            other => {
                return Err(ExchangeError::ParseError(format!(
                    "未知的订单状态: {}",
                    other
                )))
            }
        };

        let millis = self.time.or(self.update_time).unwrap_or(0);
        let timestamp =
            DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now);

        let price: f64 = self
            .price
            .parse()
            .map_err(|_| ExchangeError::ParseError(format!("无法解析价格: {}", self.price)))?;
        let amount: f64 = self
            .orig_qty
            .parse()
            .map_err(|_| ExchangeError::ParseError(format!("无法解析数量: {}", self.orig_qty)))?;

        Ok(Order {
            id: self.order_id.to_string(),
            symbol: self.symbol,
            side,
            price,
            amount,
            status,
            timestamp,
        })
    }
}

#[async_trait]
impl Exchange for BinanceFutures {
    fn name(&self) -> &str {
        "binance"
    }

    async fn get_klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Kline>> {
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), symbol.to_string());
        params.insert("interval".to_string(), interval.to_string());
        params.insert("limit".to_string(), limit.to_string());

        // 币安K线格式: [开盘时间, 开盘价, 最高价, 最低价, 收盘价, 成交量, ...]
        let klines_data: Vec<Vec<serde_json::Value>> = self
            .send_public_request("/fapi/v1/klines", params)
            .await?;

        let mut result = Vec::with_capacity(klines_data.len());
        for kline_data in klines_data {
            if kline_data.len() >= 6 {
                result.push(Kline {
                    symbol: symbol.to_string(),
                    open_time: DateTime::from_timestamp_millis(
                        kline_data[0].as_i64().unwrap_or(0),
                    )
                    .unwrap_or_else(Utc::now),
                    open: kline_data[1].as_str().unwrap_or("0").parse().unwrap_or(0.0),
                    high: kline_data[2].as_str().unwrap_or("0").parse().unwrap_or(0.0),
                    low: kline_data[3].as_str().unwrap_or("0").parse().unwrap_or(0.0),
                    close: kline_data[4].as_str().unwrap_or("0").parse().unwrap_or(0.0),
                    volume: kline_data[5].as_str().unwrap_or("0").parse().unwrap_or(0.0),
                });
            }
        }

        Ok(result)
    }

    async fn get_balance(&self, asset: &str) -> Result<Balance> {
        #[derive(Deserialize)]
        struct BinanceBalance {
            asset: String,
            balance: String,
            #[serde(rename = "availableBalance")]
            available_balance: String,
        }

        let balances: Vec<BinanceBalance> = self
            .send_signed_request("GET", "/fapi/v2/balance", HashMap::new())
            .await?;

        let entry = balances
            .into_iter()
            .find(|b| b.asset == asset)
            .ok_or_else(|| ExchangeError::ParseError(format!("账户中没有资产: {}", asset)))?;

        let total: f64 = entry
            .balance
            .parse()
            .map_err(|_| ExchangeError::ParseError(format!("无法解析余额: {}", entry.balance)))?;
        let free: f64 = entry.available_balance.parse().map_err(|_| {
            ExchangeError::ParseError(format!("无法解析可用余额: {}", entry.available_balance))
        })?;

        Ok(Balance { total, free })
    }

    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>> {
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), symbol.to_string());

        let orders: Vec<BinanceOrder> = self
            .send_signed_request("GET", "/fapi/v1/openOrders", params)
            .await?;

        orders.into_iter().map(BinanceOrder::into_order).collect()
    }

    async fn cancel_order(&self, order_id: &str, symbol: &str) -> Result<()> {
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), symbol.to_string());
        params.insert("orderId".to_string(), order_id.to_string());

        let _: serde_json::Value = self
            .send_signed_request("DELETE", "/fapi/v1/order", params)
            .await?;

        log::debug!("✅ 已取消订单 {} ({})", order_id, symbol);
        Ok(())
    }

    async fn create_limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        amount: f64,
        price: f64,
    ) -> Result<Order> {
        let (side_str, tag) = match side {
            OrderSide::Buy => ("BUY", "B"),
            OrderSide::Sell => ("SELL", "S"),
        };

        let mut params = HashMap::new();
        params.insert("symbol".to_string(), symbol.to_string());
        params.insert("side".to_string(), side_str.to_string());
        params.insert("type".to_string(), "LIMIT".to_string());
        params.insert("timeInForce".to_string(), "GTC".to_string());
        params.insert("quantity".to_string(), format!("{}", amount));
        params.insert("price".to_string(), format!("{}", price));
        params.insert(
            "newClientOrderId".to_string(),
            generate_order_id_with_tag("grid", tag),
        );

        let order: BinanceOrder = self
            .send_signed_request("POST", "/fapi/v1/order", params)
            .await?;

        order.into_order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_open_order() {
        let json = r#"{
            "orderId": 283194212,
            "symbol": "BTCUSDT",
            "side": "BUY",
            "price": "43100.50",
            "origQty": "0.004",
            "status": "NEW",
            "time": 1700000000000
        }"#;
        let raw: BinanceOrder = serde_json::from_str(json).unwrap();
        let order = raw.into_order().unwrap();

        assert_eq!(order.id, "283194212");
        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.status, OrderStatus::Open);
        assert!((order.price - 43100.50).abs() < 1e-9);
        assert_eq!(order.timestamp.timestamp_millis(), 1700000000000);
    }

    #[test]
    fn test_parse_order_unknown_side_fails() {
        let json = r#"{
            "orderId": 1,
            "symbol": "BTCUSDT",
            "side": "HOLD",
            "price": "1",
            "origQty": "1",
            "status": "NEW"
        }"#;
        let raw: BinanceOrder = serde_json::from_str(json).unwrap();
        assert!(raw.into_order().is_err());
    }
}
