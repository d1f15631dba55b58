use crate::domain::errors::DomainResult;

/// 回调签名验证端口接口
pub trait WebhookVerifierPort: Send + Sync {
    /// 验证原始请求体的签名
    fn verify(&self, raw_body: &[u8], signature: Option<&str>) -> DomainResult<()>;

    /// 是否处于免验签模式
    fn is_permissive(&self) -> bool;
}
