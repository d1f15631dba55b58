use thiserror::Error;

/// 领域层错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 缺少签名头
    #[error("Missing signature header")]
    MissingSignature,

    /// 签名验证失败
    #[error("Invalid signature")]
    InvalidSignature,

    /// 请求体不是合法的JSON对象
    #[error("Invalid JSON body")]
    InvalidJson,

    /// 验证错误
    #[error("{0}")]
    ValidationError(String),

    /// 订单存储返回错误
    #[error("Order store error: {0}")]
    StoreError(String),

    /// 数据库错误
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP请求错误
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// 加密错误
    #[error("Cryptography error: {0}")]
    CryptoError(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// 领域结果类型
pub type DomainResult<T> = Result<T, DomainError>;
