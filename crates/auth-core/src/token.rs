//! Token 服务

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use tasker_common::{AccountId, Role};
use tasker_errors::AppError;
use thiserror::Error;
use tracing::debug;

use crate::Claims;

/// Token 校验失败的类型
///
/// 过期与其它失败必须可区分，中间件对二者返回不同的消息
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::unauthorized("Token has expired"),
            TokenError::Malformed | TokenError::SignatureInvalid => {
                AppError::unauthorized("Invalid token")
            }
            TokenError::Signing(e) => AppError::internal(format!("Failed to generate token: {e}")),
        }
    }
}

/// Token 服务
///
/// 进程级对称密钥在构造时注入，之后只读
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    /// 默认有效期 24 小时
    pub const DEFAULT_LIFETIME_SECS: i64 = 24 * 60 * 60;

    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0; // 不允许时间偏差

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// 为账户签发令牌
    pub fn issue(&self, id: &AccountId, username: &str, role: Role) -> Result<String, TokenError> {
        let claims = Claims::new(id, username, role, self.lifetime)?;
        self.sign(&claims)
    }

    /// 对给定 Claims 签名
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// 校验令牌并解出 Claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                debug!(error = %e, "Token decode failed");
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                    _ => TokenError::Malformed,
                }
            })?;

        let claims = token_data.claims;

        // 签名库允许 exp == now，这里按 now >= exp 视为过期
        if claims.is_expired_at(Utc::now().timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
