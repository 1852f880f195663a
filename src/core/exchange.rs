use crate::core::types::{Balance, Kline, Order, OrderSide, Result};
use async_trait::async_trait;

/// 交易所通用接口trait
///
/// 策略层只依赖该抽象能力：行情、余额、挂单查询与限价单下撤。
#[async_trait]
pub trait Exchange: Send + Sync {
    /// 获取交易所名称
    fn name(&self) -> &str;

    /// 获取K线数据，最新的在末尾
    async fn get_klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Kline>>;

    /// 获取计价资产余额
    async fn get_balance(&self, asset: &str) -> Result<Balance>;

    /// 获取当前活跃订单
    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>>;

    /// 取消订单
    async fn cancel_order(&self, order_id: &str, symbol: &str) -> Result<()>;

    /// 创建限价单
    async fn create_limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        amount: f64,
        price: f64,
    ) -> Result<Order>;
}
