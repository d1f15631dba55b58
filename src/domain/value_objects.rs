use serde::{Deserialize, Serialize};
use std::fmt;

/// 订单状态（应用内规范状态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 待确认
    Pending,
    /// 支付成功
    Confirmed,
    /// 支付失败
    Failed,
}

impl OrderStatus {
    /// 将支付渠道的原始状态映射为规范状态
    ///
    /// 未知状态一律视为 `Pending`，避免把无法识别的状态当成终态。
    pub fn from_provider_status(raw: Option<&str>) -> Self {
        let normalized = raw.unwrap_or_default().to_uppercase();

        match normalized.as_str() {
            "SUCCESS" | "SUCCESSFUL" | "COMPLETED" => OrderStatus::Confirmed,
            "FAIL" | "FAILED" | "CANCELED" | "CANCELLED" => OrderStatus::Failed,
            _ => OrderStatus::Pending,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Failed => write!(f, "failed"),
        }
    }
}

/// 用于查找订单的唯一列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderColumn {
    /// 商户订单号
    OrderNumber,
    /// 支付渠道交易号
    TransactionId,
}

impl OrderColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderColumn::OrderNumber => "order_number",
            OrderColumn::TransactionId => "transaction_id",
        }
    }
}

impl fmt::Display for OrderColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
