use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{NewOrder, OrderColumn, OrderRecord, OrderUpdate};
use crate::ports::order_store_port::OrderStorePort;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, error};

/// Supabase / PostgREST 订单存储实现
#[derive(Clone)]
pub struct PostgrestOrderStore {
    base_url: String,
    service_key: String,
    client: Client,
}

impl PostgrestOrderStore {
    pub fn new(base_url: &str, service_key: &str, timeout: Duration) -> DomainResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// 附加认证头
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Accept", "application/json")
    }

    /// 非2xx响应转为错误
    async fn check(response: Response, action: &str) -> DomainResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        error!("Order store {} failed: {} - {}", action, status, error_text);
        Err(DomainError::StoreError(format!(
            "{} returned {}: {}",
            action, status, error_text
        )))
    }
}

fn eq_filter(value: &str) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl OrderStorePort for PostgrestOrderStore {
    async fn select_one(
        &self,
        table: &str,
        column: OrderColumn,
        value: &str,
    ) -> DomainResult<Option<OrderRecord>> {
        let request = self.client.get(self.table_url(table)).query(&[
            ("select", "id".to_string()),
            (column.as_str(), eq_filter(value)),
            ("limit", "1".to_string()),
        ]);

        let response = self.authorize(request).send().await?;
        let rows: Vec<OrderRecord> = Self::check(response, "select").await?.json().await?;

        debug!("Selected {} row(s) from {} where {}={}", rows.len(), table, column, value);
        Ok(rows.into_iter().next())
    }

    async fn update(
        &self,
        table: &str,
        fields: &OrderUpdate,
        column: OrderColumn,
        value: &str,
    ) -> DomainResult<()> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[(column.as_str(), eq_filter(value))])
            .header("Prefer", "return=minimal")
            .json(fields);

        let response = self.authorize(request).send().await?;
        Self::check(response, "update").await?;

        debug!("Updated {} where {}={}", table, column, value);
        Ok(())
    }

    async fn insert(&self, table: &str, order: &NewOrder) -> DomainResult<()> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(order);

        let response = self.authorize(request).send().await?;
        Self::check(response, "insert").await?;

        debug!(
            "Inserted into {}: order_number={:?}, transaction_id={:?}",
            table, order.order_number, order.transaction_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderStatus;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{HeaderMap, Method, StatusCode, Uri};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// 本地 PostgREST 替身收到的请求
    #[derive(Debug, Clone)]
    struct RecordedRequest {
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    }

    #[derive(Clone)]
    struct StubState {
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
        status: StatusCode,
        rows: Value,
    }

    async fn record(
        State(state): State<StubState>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> (StatusCode, Json<Value>) {
        state.requests.lock().unwrap().push(RecordedRequest {
            method,
            uri,
            headers,
            body,
        });
        (state.status, Json(state.rows.clone()))
    }

    /// 启动本地服务，返回存储实现和请求记录
    async fn stub_store(
        status: StatusCode,
        rows: Value,
    ) -> (PostgrestOrderStore, Arc<Mutex<Vec<RecordedRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(record).with_state(StubState {
            requests: requests.clone(),
            status,
            rows,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let store = PostgrestOrderStore::new(
            &format!("http://{}/", addr),
            "service-key",
            Duration::from_secs(5),
        )
        .unwrap();
        (store, requests)
    }

    fn header<'a>(request: &'a RecordedRequest, name: &str) -> Option<&'a str> {
        request.headers.get(name).and_then(|h| h.to_str().ok())
    }

    fn assert_authorized(request: &RecordedRequest) {
        assert_eq!(header(request, "apikey"), Some("service-key"));
        assert_eq!(header(request, "authorization"), Some("Bearer service-key"));
    }

    #[tokio::test]
    async fn test_select_one_request_shape() {
        let (store, requests) = stub_store(StatusCode::OK, json!([{"id": 7}])).await;

        let record = store
            .select_one("orders", OrderColumn::OrderNumber, "A100")
            .await
            .unwrap();

        assert_eq!(record, Some(OrderRecord { id: "7".to_string() }));
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.uri.path(), "/rest/v1/orders");
        assert_eq!(
            request.uri.query(),
            Some("select=id&order_number=eq.A100&limit=1")
        );
        assert_authorized(request);
    }

    #[tokio::test]
    async fn test_select_one_without_rows() {
        let (store, _requests) = stub_store(StatusCode::OK, json!([])).await;

        let record = store
            .select_one("orders", OrderColumn::TransactionId, "TX1")
            .await
            .unwrap();

        assert_eq!(record, None);
    }

    #[tokio::test]
    async fn test_update_by_transaction_id_request_shape() {
        let (store, requests) = stub_store(StatusCode::NO_CONTENT, Value::Null).await;
        let changes = OrderUpdate {
            transaction_id: None,
            payment_reference: Some("A100".to_string()),
            payment_provider: "feexpay".to_string(),
            payment_status: Some("SUCCESS".to_string()),
            status: OrderStatus::Confirmed,
        };

        store
            .update("orders", &changes, OrderColumn::TransactionId, "TX1")
            .await
            .unwrap();

        let requests = requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.uri.path(), "/rest/v1/orders");
        assert_eq!(request.uri.query(), Some("transaction_id=eq.TX1"));
        assert_eq!(header(request, "prefer"), Some("return=minimal"));
        assert_authorized(request);

        let body: Value = serde_json::from_slice(&request.body).unwrap();
        assert!(body.get("transaction_id").is_none());
        assert_eq!(body["payment_reference"], json!("A100"));
        assert_eq!(body["status"], json!("confirmed"));
    }

    #[tokio::test]
    async fn test_insert_request_shape() {
        let (store, requests) = stub_store(StatusCode::CREATED, Value::Null).await;
        let order = NewOrder {
            order_number: Some("A100".to_string()),
            transaction_id: None,
            payment_reference: Some("A100".to_string()),
            payment_provider: "feexpay".to_string(),
            payment_status: Some("SUCCESS".to_string()),
            status: OrderStatus::Confirmed,
            total_amount: Some(5000.into()),
            notes: "Created from FeexPay webhook".to_string(),
        };

        store.insert("orders", &order).await.unwrap();

        let requests = requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.uri.path(), "/rest/v1/orders");
        assert_eq!(request.uri.query(), None);
        assert_eq!(header(request, "prefer"), Some("return=minimal"));
        assert_authorized(request);

        let body: Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["order_number"], json!("A100"));
        assert_eq!(body["transaction_id"], Value::Null);
        assert_eq!(body["total_amount"], json!(5000));
    }

    #[tokio::test]
    async fn test_conflict_is_a_store_error() {
        let (store, _requests) = stub_store(
            StatusCode::CONFLICT,
            json!({"code": "23505", "message": "duplicate key value"}),
        )
        .await;
        let order = NewOrder {
            order_number: Some("A100".to_string()),
            transaction_id: Some("TX1".to_string()),
            payment_reference: Some("A100".to_string()),
            payment_provider: "feexpay".to_string(),
            payment_status: None,
            status: OrderStatus::Pending,
            total_amount: None,
            notes: "Created from FeexPay webhook".to_string(),
        };

        let result = store.insert("orders", &order).await;

        match result {
            Err(DomainError::StoreError(msg)) => {
                assert!(msg.contains("409"));
                assert!(msg.contains("duplicate key value"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let store = PostgrestOrderStore::new(
            "https://demo.supabase.co/",
            "service-key",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(store.table_url("orders"), "https://demo.supabase.co/rest/v1/orders");
        assert_eq!(eq_filter("A100"), "eq.A100");
    }

    #[tokio::test]
    async fn test_unreachable_store_is_an_error() {
        let store =
            PostgrestOrderStore::new("http://127.0.0.1:9", "service-key", Duration::from_secs(2))
                .unwrap();

        let result = store
            .select_one("orders", OrderColumn::OrderNumber, "A100")
            .await;

        assert!(matches!(result, Err(DomainError::HttpError(_))));
    }
}
