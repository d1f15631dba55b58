use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{NewOrder, OrderColumn, OrderRecord, OrderUpdate};
use crate::ports::order_store_port::OrderStorePort;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool, QueryBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// MySQL订单仓储实现
///
/// 表名和列名来自配置校验与领域结构体，值全部走参数绑定。
#[derive(Clone)]
pub struct MySqlOrderStore {
    pool: Arc<Pool<MySql>>,
}

impl MySqlOrderStore {
    pub fn new(pool: Arc<Pool<MySql>>) -> Self {
        Self { pool }
    }

    /// 建立连接池
    pub async fn connect(database_url: &str, timeout: Duration) -> DomainResult<Self> {
        let pool = MySqlPoolOptions::new()
            .acquire_timeout(timeout)
            .connect(database_url)
            .await?;

        Ok(Self::new(Arc::new(pool)))
    }
}

/// 数据库行结构体
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
}

fn to_columns<T: Serialize>(fields: &T) -> DomainResult<Map<String, Value>> {
    match serde_json::to_value(fields)? {
        Value::Object(map) => Ok(map),
        other => Err(DomainError::StoreError(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

fn push_value(builder: &mut QueryBuilder<'_, MySql>, value: &Value) {
    match value {
        Value::Null => builder.push_bind(None::<String>),
        Value::Bool(b) => builder.push_bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => builder.push_bind(i),
            None => builder.push_bind(n.as_f64()),
        },
        Value::String(s) => builder.push_bind(s.clone()),
        other => builder.push_bind(other.to_string()),
    };
}

/// UPDATE <table> SET a = ?, b = ? WHERE <column> = ?
fn build_update<'a>(
    table: &str,
    changes: &Map<String, Value>,
    column: OrderColumn,
    value: &'a str,
) -> QueryBuilder<'a, MySql> {
    let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", table));

    for (i, (name, val)) in changes.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(format!("{} = ", name));
        push_value(&mut builder, val);
    }

    builder.push(format!(" WHERE {} = ", column.as_str()));
    builder.push_bind(value);
    builder
}

/// INSERT INTO <table> (a, b) VALUES (?, ?)
fn build_insert<'a>(table: &str, row: &Map<String, Value>) -> QueryBuilder<'a, MySql> {
    let columns = row.keys().cloned().collect::<Vec<_>>().join(", ");
    let mut builder = QueryBuilder::new(format!("INSERT INTO {} ({}) VALUES (", table, columns));

    for (i, val) in row.values().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        push_value(&mut builder, val);
    }

    builder.push(")");
    builder
}

#[async_trait]
impl OrderStorePort for MySqlOrderStore {
    async fn select_one(
        &self,
        table: &str,
        column: OrderColumn,
        value: &str,
    ) -> DomainResult<Option<OrderRecord>> {
        let query = format!(
            "SELECT CAST(id AS CHAR) AS id FROM {} WHERE {} = ? LIMIT 1",
            table,
            column.as_str()
        );

        let result = sqlx::query_as::<_, OrderRow>(&query)
            .bind(value)
            .fetch_optional(self.pool.as_ref())
            .await?;

        debug!("Lookup {}.{}={} found={}", table, column, value, result.is_some());
        Ok(result.map(|row| OrderRecord { id: row.id }))
    }

    async fn update(
        &self,
        table: &str,
        fields: &OrderUpdate,
        column: OrderColumn,
        value: &str,
    ) -> DomainResult<()> {
        let changes = to_columns(fields)?;
        let rows_affected = build_update(table, &changes, column, value)
            .build()
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        debug!("Order updated where {}={}: {} row(s)", column, value, rows_affected);
        Ok(())
    }

    async fn insert(&self, table: &str, order: &NewOrder) -> DomainResult<()> {
        let row = to_columns(order)?;
        build_insert(table, &row)
            .build()
            .execute(self.pool.as_ref())
            .await?;

        debug!(
            "Order inserted: order_number={:?}, transaction_id={:?}",
            order.order_number, order.transaction_id
        );
        Ok(())
    }
}
