use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 支付回调请求体（任意JSON对象）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct WebhookPayload(pub Map<String, Value>);

impl WebhookPayload {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// 回调确认响应
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// 服务标识（根路径探活）
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub ok: bool,
    pub service: String,
    pub version: &'static str,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: String, message: String) -> Self {
        Self { error, message }
    }
}
