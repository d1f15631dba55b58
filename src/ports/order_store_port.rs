use crate::domain::errors::DomainResult;
use crate::domain::{NewOrder, OrderColumn, OrderRecord, OrderUpdate};
use async_trait::async_trait;

/// 订单存储端口接口
///
/// 只暴露三种操作，底层数据库由外部协作方提供。
#[async_trait]
pub trait OrderStorePort: Send + Sync {
    /// 按列查找一条订单（最多一条）
    async fn select_one(
        &self,
        table: &str,
        column: OrderColumn,
        value: &str,
    ) -> DomainResult<Option<OrderRecord>>;

    /// 更新匹配的订单
    async fn update(
        &self,
        table: &str,
        fields: &OrderUpdate,
        column: OrderColumn,
        value: &str,
    ) -> DomainResult<()>;

    /// 插入新订单
    async fn insert(&self, table: &str, order: &NewOrder) -> DomainResult<()>;
}
