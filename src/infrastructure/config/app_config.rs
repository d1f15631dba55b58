use crate::domain::errors::{DomainError, DomainResult};
use std::time::Duration;

/// 订单存储后端配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Supabase / PostgREST 接口
    Postgrest {
        /// 服务基础URL
        base_url: String,
        /// service role 密钥
        service_key: String,
    },
    /// MySQL 直连
    MySql {
        database_url: String,
    },
    /// 进程内存储（本地调试）
    Memory,
}

impl StoreConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            StoreConfig::Postgrest { .. } => "postgrest",
            StoreConfig::MySql { .. } => "mysql",
            StoreConfig::Memory => "memory",
        }
    }
}

/// 支付渠道配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// 渠道名称（路由、签名头、默认 payment_provider）
    pub name: String,

    /// 展示名称（写入订单备注）
    pub label: String,

    /// 回调签名密钥，未配置时不验签
    pub webhook_secret: Option<String>,
}

impl ProviderConfig {
    /// 回调路由
    pub fn webhook_path(&self) -> String {
        format!("/webhooks/{}", self.name)
    }

    /// 渠道专用签名头
    pub fn signature_header(&self) -> String {
        format!("x-{}-signature", self.name)
    }

    /// 服务名称
    pub fn service_name(&self) -> String {
        format!("{}-webhook", self.name)
    }
}

/// 应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub orders_table: String,
    pub store_timeout: Duration,
    pub provider: ProviderConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                DomainError::ConfigurationError(format!(
                    "Missing required environment variable: {}",
                    key
                ))
            })
        };

        let backend = get("ORDER_STORE_BACKEND").unwrap_or_else(|| "postgrest".to_string());
        let store = match backend.to_lowercase().as_str() {
            "postgrest" | "supabase" => StoreConfig::Postgrest {
                base_url: require("SUPABASE_URL")?.trim_end_matches('/').to_string(),
                service_key: require("SUPABASE_SERVICE_ROLE_KEY")?,
            },
            "mysql" => StoreConfig::MySql {
                database_url: require("DATABASE_URL")?,
            },
            "memory" => StoreConfig::Memory,
            other => {
                return Err(DomainError::ConfigurationError(format!(
                    "Unknown ORDER_STORE_BACKEND: {}",
                    other
                )));
            }
        };

        let orders_table = get("ORDERS_TABLE").unwrap_or_else(|| "orders".to_string());
        if !is_identifier(&orders_table) {
            return Err(DomainError::ConfigurationError(format!(
                "ORDERS_TABLE must be alphanumeric or underscore: {}",
                orders_table
            )));
        }

        let provider_name = get("WEBHOOK_PROVIDER")
            .unwrap_or_else(|| "feexpay".to_string())
            .to_lowercase();
        if !provider_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::ConfigurationError(format!(
                "WEBHOOK_PROVIDER contains invalid characters: {}",
                provider_name
            )));
        }

        let store_timeout = match get("STORE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number(&raw, "STORE_TIMEOUT_SECS")?),
            None => Duration::from_secs(10),
        };

        let port = match get("SERVER_PORT") {
            Some(raw) => parse_number(&raw, "SERVER_PORT")?,
            None => 3000,
        };

        Ok(Self {
            host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            store,
            orders_table,
            store_timeout,
            provider: ProviderConfig {
                label: get("WEBHOOK_PROVIDER_LABEL").unwrap_or_else(|| "FeexPay".to_string()),
                name: provider_name,
                // 密钥只有空字符串才视为未配置，纯空白仍然要求验签
                webhook_secret: lookup("FEEPAY_WEBHOOK_SECRET").filter(|v| !v.is_empty()),
            },
        })
    }

    /// 监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_number<T: std::str::FromStr>(raw: &str, key: &str) -> DomainResult<T> {
    raw.trim().parse().map_err(|_| {
        DomainError::ConfigurationError(format!("{} must be a number, got {}", key, raw))
    })
}
