mod api;
mod application;
mod domain;
mod infrastructure;
mod ports;

use api::AppState;
use application::ReconciliationService;
use infrastructure::{
    AppConfig, HmacWebhookVerifier, InMemoryOrderStore, MySqlOrderStore, PostgrestOrderStore,
    StoreConfig,
};
use ports::{OrderStorePort, WebhookVerifierPort};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting payment webhook service...");

    // 加载配置
    let config = AppConfig::from_env()?;
    info!(
        "Order store backend: {}, table: {}",
        config.store.backend_name(),
        config.orders_table
    );

    match &config.store {
        StoreConfig::Postgrest {
            base_url,
            service_key,
        } => {
            let store = PostgrestOrderStore::new(base_url, service_key, config.store_timeout)?;
            serve(config.clone(), Arc::new(store)).await
        }
        StoreConfig::MySql { database_url } => {
            info!("Connecting to database...");
            let store = MySqlOrderStore::connect(database_url, config.store_timeout).await?;
            info!("Database connected successfully");
            serve(config.clone(), Arc::new(store)).await
        }
        StoreConfig::Memory => {
            warn!("Using in-memory order store, orders are lost on restart");
            serve(config.clone(), Arc::new(InMemoryOrderStore::new())).await
        }
    }
}

async fn serve<R: OrderStorePort + 'static>(config: AppConfig, store: Arc<R>) -> anyhow::Result<()> {
    // 创建签名验证器
    let verifier = HmacWebhookVerifier::new(config.provider.webhook_secret.as_deref());
    if verifier.is_permissive() {
        warn!("FEEPAY_WEBHOOK_SECRET is not set: webhook signatures will NOT be verified");
    }

    // 创建对账服务
    let reconciliation_service = Arc::new(ReconciliationService::new(
        store,
        config.orders_table.clone(),
        config.provider.name.clone(),
        &config.provider.label,
    ));

    // 创建应用状态
    let app_state = AppState {
        reconciliation_service,
        verifier: Arc::new(verifier),
        provider: Arc::new(config.provider.clone()),
    };

    // 创建路由
    let app = api::create_router(app_state);

    // 启动服务器
    let addr = config.bind_addr();

    info!("Server listening on {}", addr);
    info!("Available endpoints:");
    info!("  GET  /health - Health check");
    info!("  GET  / , POST / - Service info");
    info!("  POST {} - {} payment webhook", config.provider.webhook_path(), config.provider.label);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
