//! ditto-auth-core - 认证核心库
//!
//! JWT Claims 与 token 签发/校验。校验失败分两类：签名或结构错误
//! （PermissionDenied）和 token 本身已失效（Unauthenticated）。

use chrono::{Duration, Utc};
use ditto_common::CallerId;
use ditto_errors::{AppError, AppResult};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT Claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_name: String,
    pub user_id: String,
    /// Expiration time
    pub exp: i64,
    /// Issued at
    #[serde(default)]
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        expires_in_secs: i64,
        issuer: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_name: user_name.into(),
            user_id: user_id.into(),
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
            iat: now.timestamp(),
            iss: issuer,
        }
    }

    pub fn caller_id(&self) -> CallerId {
        CallerId::new(self.user_id.clone())
    }
}

/// token 校验失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// 无法解析或签名不匹配
    #[error("invalid signature: {0}")]
    Signature(String),
    /// 签名正确，但 token 已过期、未生效或签发方不符
    #[error("token rejected: {0}")]
    Rejected(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signature(msg) => AppError::permission_denied(msg),
            TokenError::Rejected(msg) => AppError::unauthenticated(msg),
        }
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature
        | ErrorKind::ImmatureSignature
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::MissingRequiredClaim(_) => TokenError::Rejected(err.to_string()),
        _ => TokenError::Signature(err.to_string()),
    }
}

/// Token 服务
///
/// 签名密钥在构造后只读，可在所有请求间共享。
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: i64,
    issuer: Option<String>,
}

impl TokenService {
    pub fn new(secret: &str, expires_in: i64, issuer: Option<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
            issuer,
        }
    }

    /// 签发访问令牌
    pub fn issue(&self, user_id: &str, user_name: &str) -> AppResult<String> {
        let claims = Claims::new(user_id, user_name, self.expires_in, self.issuer.clone());
        self.sign(&claims)
    }

    /// 按给定 Claims 签名
    pub fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {}", e)))
    }

    /// 校验令牌并返回 Claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(classify)?;
        Ok(data.claims)
    }

    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 3600, None)
    }

    #[test]
    fn test_issue_and_verify() {
        let svc = service();
        let token = svc.issue("u1", "alice").unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.user_id, "u1");
        assert_eq!(claims.user_name, "alice");
        assert_eq!(claims.caller_id(), CallerId::new("u1"));
    }

    #[test]
    fn test_wrong_key_is_signature_error() {
        let other = TokenService::new("another-secret", 3600, None);
        let token = other.issue("u1", "alice").unwrap();
        let err = service().verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Signature(_)));
        assert!(matches!(AppError::from(err), AppError::PermissionDenied(_)));
    }

    #[test]
    fn test_garbage_is_signature_error() {
        let err = service().verify("not-a-jwt").unwrap_err();
        assert!(matches!(err, TokenError::Signature(_)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let svc = service();
        let claims = Claims::new("u1", "alice", -120, None);
        let token = svc.sign(&claims).unwrap();
        let err = svc.verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Rejected(_)));
        assert!(matches!(AppError::from(err), AppError::Unauthenticated(_)));
    }

    #[test]
    fn test_issuer_mismatch_is_rejected() {
        let svc = TokenService::new("test-secret", 3600, Some("ditto".to_string()));
        let foreign = TokenService::new("test-secret", 3600, Some("someone-else".to_string()));
        let token = foreign.issue("u1", "alice").unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::Rejected(_))));
    }
}
