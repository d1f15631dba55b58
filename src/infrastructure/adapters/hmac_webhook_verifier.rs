use crate::domain::errors::{DomainError, DomainResult};
use crate::ports::WebhookVerifierPort;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 回调签名验证
///
/// 签名为原始请求体的小写十六进制 HMAC-SHA256 摘要。
#[derive(Clone)]
pub struct HmacWebhookVerifier {
    secret: Option<Vec<u8>>,
}

impl HmacWebhookVerifier {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret
                .filter(|s| !s.is_empty())
                .map(|s| s.as_bytes().to_vec()),
        }
    }

    /// 计算请求体的期望签名，未配置密钥时返回 `None`
    pub fn sign(&self, raw_body: &[u8]) -> DomainResult<Option<String>> {
        let Some(secret) = &self.secret else {
            return Ok(None);
        };

        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| DomainError::CryptoError(format!("HMAC init error: {}", e)))?;
        mac.update(raw_body);

        Ok(Some(hex::encode(mac.finalize().into_bytes())))
    }
}

impl WebhookVerifierPort for HmacWebhookVerifier {
    fn verify(&self, raw_body: &[u8], signature: Option<&str>) -> DomainResult<()> {
        let Some(expected) = self.sign(raw_body)? else {
            debug!("Webhook secret not configured, signature check skipped");
            return Ok(());
        };

        let provided = signature
            .filter(|s| !s.is_empty())
            .ok_or(DomainError::MissingSignature)?;

        if !bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
            warn!("Webhook signature mismatch");
            return Err(DomainError::InvalidSignature);
        }

        debug!("Webhook signature verified");
        Ok(())
    }

    fn is_permissive(&self) -> bool {
        self.secret.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"order_number":"A100","status":"SUCCESS"}"#;

    #[test]
    fn test_permissive_mode_accepts_anything() {
        let verifier = HmacWebhookVerifier::new(None);

        assert!(verifier.is_permissive());
        assert!(verifier.verify(BODY, None).is_ok());
        assert!(verifier.verify(BODY, Some("garbage")).is_ok());
        assert!(HmacWebhookVerifier::new(Some("")).is_permissive());
    }

    #[test]
    fn test_valid_signature() {
        let verifier = HmacWebhookVerifier::new(Some("whsec_feexpay"));
        let signature = verifier.sign(BODY).unwrap().unwrap();

        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert!(verifier.verify(BODY, Some(&signature)).is_ok());
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2
        let verifier = HmacWebhookVerifier::new(Some("Jefe"));
        let signature = verifier
            .sign(b"what do ya want for nothing?")
            .unwrap()
            .unwrap();

        assert_eq!(
            signature,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_missing_signature() {
        let verifier = HmacWebhookVerifier::new(Some("whsec_feexpay"));

        assert!(matches!(
            verifier.verify(BODY, None),
            Err(DomainError::MissingSignature)
        ));
        assert!(matches!(
            verifier.verify(BODY, Some("")),
            Err(DomainError::MissingSignature)
        ));
    }

    #[test]
    fn test_invalid_signature() {
        let verifier = HmacWebhookVerifier::new(Some("whsec_feexpay"));
        let signature = verifier.sign(BODY).unwrap().unwrap();

        assert!(matches!(
            verifier.verify(BODY, Some(&"0".repeat(64))),
            Err(DomainError::InvalidSignature)
        ));
        assert!(matches!(
            verifier.verify(BODY, Some(&signature.to_uppercase())),
            Err(DomainError::InvalidSignature)
        ));
        assert!(matches!(
            verifier.verify(BODY, Some(&signature[..10])),
            Err(DomainError::InvalidSignature)
        ));
    }

    #[test]
    fn test_signature_changes_with_body() {
        let verifier = HmacWebhookVerifier::new(Some("whsec_feexpay"));
        let mut tampered = BODY.to_vec();
        tampered[2] ^= 0x01;

        let original = verifier.sign(BODY).unwrap();
        assert_eq!(original, verifier.sign(BODY).unwrap());
        assert_ne!(original, verifier.sign(&tampered).unwrap());

        let original = original.unwrap();
        assert!(matches!(
            verifier.verify(&tampered, Some(&original)),
            Err(DomainError::InvalidSignature)
        ));
    }
}
