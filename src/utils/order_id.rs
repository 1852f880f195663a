/// 订单ID生成器
///
/// 为网格订单生成唯一且可识别的客户端订单ID。
/// Binance限制：最长36字符，仅字母数字。
use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};

static ORDER_COUNTER: AtomicU32 = AtomicU32::new(0);

const MAX_ORDER_ID_LENGTH: usize = 36;

/// 生成带标签的客户端订单ID，格式: {prefix}{tag}{毫秒时间戳}{序号}
///
/// 例如 gridB17214508123450042
pub fn generate_order_id_with_tag(prefix: &str, tag: &str) -> String {
    let counter = ORDER_COUNTER.fetch_add(1, Ordering::Relaxed) % 10000;
    let timestamp = Utc::now().timestamp_millis();

    let mut id = format!("{}{}{}{:04}", prefix, tag, timestamp, counter);
    id.retain(|c| c.is_ascii_alphanumeric());
    id.truncate(MAX_ORDER_ID_LENGTH);
    id
}
