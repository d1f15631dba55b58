use super::handlers::*;
use crate::ports::{OrderStorePort, WebhookVerifierPort};
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router<V, R>(state: AppState<V, R>) -> Router
where
    V: WebhookVerifierPort + 'static,
    R: OrderStorePort + 'static,
{
    let webhook_path = state.provider.webhook_path();

    // 回调通过签名认证，不依赖Cookie
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root::<V, R>).post(root::<V, R>))
        .route("/health", get(health_check))
        .route(&webhook_path, post(receive_webhook::<V, R>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
