//! 测试用交易所桩实现

use crate::core::error::ExchangeError;
use crate::core::exchange::Exchange;
use crate::core::types::{Balance, Kline, Order, OrderSide, OrderStatus, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// 内存版交易所，可编排失败脚本
pub struct MockExchange {
    klines: Mutex<Vec<Kline>>,
    balance: Mutex<Balance>,
    open_orders: Mutex<Vec<Order>>,
    placed: Mutex<Vec<Order>>,
    cancelled: Mutex<Vec<String>>,
    /// 按顺序弹出的下单结果脚本，弹空后一律成功
    place_script: Mutex<VecDeque<std::result::Result<(), ExchangeError>>>,
    fail_klines: AtomicBool,
    fail_balance: AtomicBool,
    /// K线查询的模拟延迟（毫秒），用于制造执行中的周期
    klines_delay_ms: AtomicU64,
    next_id: AtomicU64,
}

impl MockExchange {
    pub fn new() -> Self {
        Self {
            klines: Mutex::new(Vec::new()),
            balance: Mutex::new(Balance {
                total: 1000.0,
                free: 1000.0,
            }),
            open_orders: Mutex::new(Vec::new()),
            placed: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            place_script: Mutex::new(VecDeque::new()),
            fail_klines: AtomicBool::new(false),
            fail_balance: AtomicBool::new(false),
            klines_delay_ms: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    /// 用收盘价序列填充K线，1小时间隔，最新的在末尾
    pub fn set_closes(&self, closes: &[f64]) {
        let start = Utc::now() - Duration::hours(closes.len() as i64);
        let klines = closes
            .iter()
            .enumerate()
            .map(|(i, close)| Kline {
                symbol: "BTCUSDT".to_string(),
                open_time: start + Duration::hours(i as i64),
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 1.0,
            })
            .collect();
        *self.klines.lock().unwrap() = klines;
    }

    pub fn set_balance(&self, total: f64, free: f64) {
        *self.balance.lock().unwrap() = Balance { total, free };
    }

    pub fn seed_open_orders(&self, count: usize, timestamp: DateTime<Utc>) {
        let mut orders = self.open_orders.lock().unwrap();
        for _ in 0..count {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            orders.push(Order {
                id: id.to_string(),
                symbol: "BTCUSDT".to_string(),
                side: OrderSide::Buy,
                price: 100.0,
                amount: 0.1,
                status: OrderStatus::Open,
                timestamp,
            });
        }
    }

    pub fn script_place_results(&self, results: Vec<std::result::Result<(), ExchangeError>>) {
        *self.place_script.lock().unwrap() = results.into();
    }

    pub fn set_fail_klines(&self, fail: bool) {
        self.fail_klines.store(fail, Ordering::Relaxed);
    }

    pub fn set_fail_balance(&self, fail: bool) {
        self.fail_balance.store(fail, Ordering::Relaxed);
    }

    pub fn set_klines_delay_ms(&self, millis: u64) {
        self.klines_delay_ms.store(millis, Ordering::Relaxed);
    }

    pub fn placed_orders(&self) -> Vec<Order> {
        self.placed.lock().unwrap().clone()
    }

    pub fn cancelled_ids(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    pub fn open_order_count(&self) -> usize {
        self.open_orders.lock().unwrap().len()
    }
}

#[async_trait]
impl Exchange for MockExchange {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_klines(&self, _symbol: &str, _interval: &str, limit: u32) -> Result<Vec<Kline>> {
        let delay = self.klines_delay_ms.load(Ordering::Relaxed);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        if self.fail_klines.load(Ordering::Relaxed) {
            return Err(ExchangeError::Other("模拟网络故障".to_string()));
        }
        let klines = self.klines.lock().unwrap();
        let len = klines.len();
        let take = (limit as usize).min(len);
        Ok(klines[len - take..].to_vec())
    }

    async fn get_balance(&self, _asset: &str) -> Result<Balance> {
        if self.fail_balance.load(Ordering::Relaxed) {
            return Err(ExchangeError::Other("模拟余额查询故障".to_string()));
        }
        Ok(*self.balance.lock().unwrap())
    }

    async fn get_open_orders(&self, _symbol: &str) -> Result<Vec<Order>> {
        Ok(self.open_orders.lock().unwrap().clone())
    }

    async fn cancel_order(&self, order_id: &str, _symbol: &str) -> Result<()> {
        let mut orders = self.open_orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| o.id != order_id);
        if orders.len() == before {
            return Err(ExchangeError::OrderError(format!(
                "订单不存在: {}",
                order_id
            )));
        }
        self.cancelled.lock().unwrap().push(order_id.to_string());
        Ok(())
    }

    async fn create_limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        amount: f64,
        price: f64,
    ) -> Result<Order> {
        if let Some(result) = self.place_script.lock().unwrap().pop_front() {
            result?;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let order = Order {
            id: id.to_string(),
            symbol: symbol.to_string(),
            side,
            price,
            amount,
            status: OrderStatus::Open,
            timestamp: Utc::now(),
        };
        self.open_orders.lock().unwrap().push(order.clone());
        self.placed.lock().unwrap().push(order.clone());
        Ok(order)
    }
}
