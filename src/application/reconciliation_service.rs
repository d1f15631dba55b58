use crate::application::dto::WebhookPayload;
use crate::domain::errors::DomainResult;
use crate::domain::{OrderColumn, PaymentNotification, Resolution};
use crate::ports::OrderStorePort;
use std::sync::Arc;
use tracing::{debug, info};

/// 订单对账服务
///
/// 查询与写入是两次独立的调用，没有事务包裹。同一订单的并发回调可能同时
/// 走到插入分支，目前依赖数据库唯一约束兜底。
pub struct ReconciliationService<R: OrderStorePort> {
    repository: Arc<R>,
    table: String,
    default_provider: String,
    insert_note: String,
}

impl<R: OrderStorePort> ReconciliationService<R> {
    pub fn new(
        repository: Arc<R>,
        table: impl Into<String>,
        default_provider: impl Into<String>,
        provider_label: &str,
    ) -> Self {
        Self {
            repository,
            table: table.into(),
            default_provider: default_provider.into(),
            insert_note: format!("Created by {} webhook", provider_label),
        }
    }

    /// 处理支付回调，返回实际执行的决策
    pub async fn reconcile(&self, payload: WebhookPayload) -> DomainResult<Resolution> {
        // 1. 提取字段并校验（失败时不访问数据库）
        let notification =
            PaymentNotification::from_payload(payload.fields(), &self.default_provider)?;

        debug!(
            "Reconciling notification: order_ref={:?}, transaction_id={:?}, status={:?}",
            notification.order_ref, notification.transaction_id, notification.provider_status
        );

        // 2. 按商户订单号查找
        let found_by_order_number = match &notification.order_ref {
            Some(order_ref) => self.exists(OrderColumn::OrderNumber, order_ref).await?,
            None => false,
        };

        // 3. 未命中时按交易号查找
        let found_by_transaction_id = match (&notification.transaction_id, found_by_order_number) {
            (Some(tx_id), false) => self.exists(OrderColumn::TransactionId, tx_id).await?,
            _ => false,
        };

        // 4. 决策并执行
        let resolution = Resolution::decide(
            &notification,
            found_by_order_number,
            found_by_transaction_id,
            &self.insert_note,
        );
        self.apply(&resolution).await?;

        Ok(resolution)
    }

    /// 执行对账决策
    pub async fn apply(&self, resolution: &Resolution) -> DomainResult<()> {
        match resolution {
            Resolution::UpdateByOrderNumber {
                order_number,
                changes,
            } => {
                self.repository
                    .update(&self.table, changes, OrderColumn::OrderNumber, order_number)
                    .await?;
                info!(
                    "Order updated by order_number {}: status={}",
                    order_number, changes.status
                );
            }
            Resolution::UpdateByTransactionId {
                transaction_id,
                changes,
            } => {
                self.repository
                    .update(&self.table, changes, OrderColumn::TransactionId, transaction_id)
                    .await?;
                info!(
                    "Order updated by transaction_id {}: status={}",
                    transaction_id, changes.status
                );
            }
            Resolution::Insert(order) => {
                self.repository.insert(&self.table, order).await?;
                info!(
                    "Order created from webhook: order_number={:?}, transaction_id={:?}, status={}",
                    order.order_number, order.transaction_id, order.status
                );
            }
        }

        Ok(())
    }

    async fn exists(&self, column: OrderColumn, value: &str) -> DomainResult<bool> {
        let found = self
            .repository
            .select_one(&self.table, column, value)
            .await?;

        match &found {
            Some(record) => debug!("Lookup {}={} matched order {}", column, value, record.id),
            None => debug!("Lookup {}={} matched nothing", column, value),
        }
        Ok(found.is_some())
    }
}
