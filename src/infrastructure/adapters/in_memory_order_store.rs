use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{NewOrder, OrderColumn, OrderRecord, OrderUpdate};
use crate::ports::order_store_port::OrderStorePort;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

type Row = Map<String, Value>;

/// 进程内订单存储
///
/// 行以JSON对象保存，ID自增。用于本地调试和测试。
#[derive(Default)]
pub struct InMemoryOrderStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一行数据，返回分配的ID
    #[cfg(test)]
    pub fn seed(&self, table: &str, row: Value) -> DomainResult<String> {
        let row = match row {
            Value::Object(map) => map,
            _ => Row::new(),
        };
        self.push(table, row)
    }

    /// 表内所有行的快照
    #[cfg(test)]
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock()
            .ok()
            .and_then(|tables| tables.get(table).cloned())
            .unwrap_or_default()
    }

    fn lock(&self) -> DomainResult<std::sync::MutexGuard<'_, HashMap<String, Vec<Row>>>> {
        self.tables
            .lock()
            .map_err(|_| DomainError::StoreError("in-memory store poisoned".to_string()))
    }

    fn push(&self, table: &str, mut row: Row) -> DomainResult<String> {
        let mut tables = self.lock()?;
        let rows = tables.entry(table.to_string()).or_default();
        let id = (rows.len() + 1).to_string();
        row.insert("id".to_string(), Value::String(id.clone()));
        rows.push(row);
        Ok(id)
    }
}

fn to_row<T: Serialize>(fields: &T) -> DomainResult<Row> {
    match serde_json::to_value(fields)? {
        Value::Object(map) => Ok(map),
        other => Err(DomainError::StoreError(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

#[async_trait]
impl OrderStorePort for InMemoryOrderStore {
    async fn select_one(
        &self,
        table: &str,
        column: OrderColumn,
        value: &str,
    ) -> DomainResult<Option<OrderRecord>> {
        let tables = self.lock()?;
        let found = tables
            .get(table)
            .and_then(|rows| {
                rows.iter()
                    .find(|row| row.get(column.as_str()).and_then(Value::as_str) == Some(value))
            })
            .and_then(|row| row.get("id").and_then(Value::as_str))
            .map(|id| OrderRecord { id: id.to_string() });

        Ok(found)
    }

    async fn update(
        &self,
        table: &str,
        fields: &OrderUpdate,
        column: OrderColumn,
        value: &str,
    ) -> DomainResult<()> {
        let changes = to_row(fields)?;
        let mut tables = self.lock()?;
        let mut updated = 0;

        for row in tables.entry(table.to_string()).or_default().iter_mut() {
            if row.get(column.as_str()).and_then(Value::as_str) == Some(value) {
                for (key, val) in &changes {
                    row.insert(key.clone(), val.clone());
                }
                updated += 1;
            }
        }

        debug!("In-memory update on {} where {}={}: {} row(s)", table, column, value, updated);
        Ok(())
    }

    async fn insert(&self, table: &str, order: &NewOrder) -> DomainResult<()> {
        let row = to_row(order)?;
        let id = self.push(table, row)?;

        debug!("In-memory insert into {}: id={}", table, id);
        Ok(())
    }
}
