use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 签名辅助工具
pub struct SignatureHelper;

impl SignatureHelper {
    /// Binance 签名: HMAC-SHA256(query_string)，十六进制输出
    pub fn binance_signature(secret: &str, query_string: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC 支持任意长度密钥");
        mac.update(query_string.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
