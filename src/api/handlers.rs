use crate::application::{
    AckResponse, ErrorResponse, HealthResponse, ReconciliationService, ServiceInfo, WebhookPayload,
};
use crate::domain::errors::DomainError;
use crate::infrastructure::ProviderConfig;
use crate::ports::{OrderStorePort, WebhookVerifierPort};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 通用签名头
pub const GENERIC_SIGNATURE_HEADER: &str = "x-signature";

/// 应用状态
pub struct AppState<V: WebhookVerifierPort, R: OrderStorePort> {
    pub reconciliation_service: Arc<ReconciliationService<R>>,
    pub verifier: Arc<V>,
    pub provider: Arc<ProviderConfig>,
}

impl<V: WebhookVerifierPort, R: OrderStorePort> Clone for AppState<V, R> {
    fn clone(&self) -> Self {
        Self {
            reconciliation_service: self.reconciliation_service.clone(),
            verifier: self.verifier.clone(),
            provider: self.provider.clone(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// 领域错误转为HTTP响应
fn error_response(e: DomainError) -> ApiError {
    let (status, code) = match &e {
        DomainError::MissingSignature | DomainError::InvalidSignature => {
            (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE")
        }
        DomainError::InvalidJson => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
        DomainError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "WEBHOOK_ERROR"),
    };

    (status, Json(ErrorResponse::new(code.to_string(), e.to_string())))
}

/// 读取签名头，渠道专用头优先
fn signature_header<'a>(headers: &'a HeaderMap, provider_header: &str) -> Option<&'a str> {
    [provider_header, GENERIC_SIGNATURE_HEADER]
        .into_iter()
        .find_map(|name| {
            headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .filter(|s| !s.is_empty())
        })
}

/// 支付回调
pub async fn receive_webhook<V: WebhookVerifierPort, R: OrderStorePort>(
    State(state): State<AppState<V, R>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    info!("Received {} payment webhook ({} bytes)", state.provider.name, body.len());

    // 1. 验证签名（基于原始字节）
    let signature = signature_header(&headers, &state.provider.signature_header());
    state.verifier.verify(&body, signature).map_err(|e| {
        warn!("Webhook rejected: {}", e);
        error_response(e)
    })?;

    // 2. 解析JSON
    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        warn!("Failed to parse webhook body: {}", e);
        error_response(DomainError::InvalidJson)
    })?;

    // 3. 对账
    state
        .reconciliation_service
        .reconcile(payload)
        .await
        .map(|resolution| {
            info!("Webhook processed: status={}", resolution.status());
            (StatusCode::OK, Json(AckResponse { ok: true }))
        })
        .map_err(|e| {
            match &e {
                DomainError::ValidationError(_) => warn!("Webhook validation error: {}", e),
                _ => error!("Webhook handling error: {}", e),
            }
            error_response(e)
        })
}

/// 根路径探活
pub async fn root<V: WebhookVerifierPort, R: OrderStorePort>(
    State(state): State<AppState<V, R>>,
) -> impl IntoResponse {
    Json(ServiceInfo {
        ok: true,
        service: state.provider.service_name(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 健康检查
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "healthy" }))
}
