use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::OrderStatus;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// 已存在订单（只关心其主键）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderRecord {
    /// 订单ID，统一转为文本
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

/// 支付回调通知（已提取并校验的字段）
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentNotification {
    /// 渠道交易号
    pub transaction_id: Option<String>,

    /// 商户订单号
    pub order_ref: Option<String>,

    /// 渠道原始状态
    pub provider_status: Option<String>,

    /// 支付渠道名称
    pub provider_name: String,

    /// 支付金额
    pub amount: Option<Number>,

    /// 规范状态
    pub status: OrderStatus,
}

impl PaymentNotification {
    /// 从回调JSON对象中提取字段
    ///
    /// 每个字段按候选键顺序取第一个有值的键。
    pub fn from_payload(payload: &Map<String, Value>, default_provider: &str) -> DomainResult<Self> {
        let transaction_id = first_text(payload, &["transaction_id", "reference"]);
        let order_ref = first_text(payload, &["order_number", "reference"]);

        if transaction_id.is_none() && order_ref.is_none() {
            return Err(DomainError::ValidationError(
                "transaction_id or order_number is required".to_string(),
            ));
        }

        let provider_status = first_text(payload, &["status", "payment_status"]);
        let provider_name = first_text(payload, &["payment_provider"])
            .unwrap_or_else(|| default_provider.to_string());
        let status = OrderStatus::from_provider_status(provider_status.as_deref());

        Ok(Self {
            transaction_id,
            order_ref,
            provider_status,
            provider_name,
            amount: payload.get("amount").and_then(as_amount),
            status,
        })
    }
}

fn first_text(payload: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match payload.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        // 数值 0 与空字符串一样视为未提供
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    })
}

fn as_amount(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 订单更新字段
///
/// `transaction_id` 为 `None` 时不写入该列；`Some(None)` 会把该列置空。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<Option<String>>,
    pub payment_reference: Option<String>,
    pub payment_provider: String,
    pub payment_status: Option<String>,
    pub status: OrderStatus,
}

/// 新建的最小订单
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub order_number: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_reference: Option<String>,
    pub payment_provider: String,
    pub payment_status: Option<String>,
    pub status: OrderStatus,
    pub total_amount: Option<Number>,
    pub notes: String,
}

/// 对账决策
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// 按商户订单号更新
    UpdateByOrderNumber {
        order_number: String,
        changes: OrderUpdate,
    },
    /// 按渠道交易号更新
    UpdateByTransactionId {
        transaction_id: String,
        changes: OrderUpdate,
    },
    /// 插入新订单
    Insert(NewOrder),
}

impl Resolution {
    /// 根据查询结果决定如何落库（纯函数）
    ///
    /// 商户订单号匹配优先于交易号匹配。
    pub fn decide(
        notification: &PaymentNotification,
        found_by_order_number: bool,
        found_by_transaction_id: bool,
        insert_note: &str,
    ) -> Self {
        let n = notification;

        if let (Some(order_number), true) = (&n.order_ref, found_by_order_number) {
            return Resolution::UpdateByOrderNumber {
                order_number: order_number.clone(),
                changes: OrderUpdate {
                    transaction_id: Some(n.transaction_id.clone()),
                    payment_reference: Some(order_number.clone()),
                    payment_provider: n.provider_name.clone(),
                    payment_status: n.provider_status.clone(),
                    status: n.status,
                },
            };
        }

        if let (Some(transaction_id), true) = (&n.transaction_id, found_by_transaction_id) {
            return Resolution::UpdateByTransactionId {
                transaction_id: transaction_id.clone(),
                changes: OrderUpdate {
                    transaction_id: None,
                    payment_reference: n.order_ref.clone(),
                    payment_provider: n.provider_name.clone(),
                    payment_status: n.provider_status.clone(),
                    status: n.status,
                },
            };
        }

        Resolution::Insert(NewOrder {
            order_number: n.order_ref.clone(),
            transaction_id: n.transaction_id.clone(),
            payment_reference: n.order_ref.clone(),
            payment_provider: n.provider_name.clone(),
            payment_status: n.provider_status.clone(),
            status: n.status,
            total_amount: n.amount.clone(),
            notes: insert_note.to_string(),
        })
    }

    pub fn status(&self) -> OrderStatus {
        match self {
            Resolution::UpdateByOrderNumber { changes, .. }
            | Resolution::UpdateByTransactionId { changes, .. } => changes.status,
            Resolution::Insert(order) => order.status,
        }
    }
}
