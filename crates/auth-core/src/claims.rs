//! JWT Claims 与请求身份

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tasker_common::{AccountId, Role};

use crate::TokenError;

/// JWT Claims
///
/// 签发后不可变；有效性只取决于签名和 `now < exp`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID)
    pub id: String,
    /// Subject username
    pub username: String,
    /// Subject role
    pub role: Role,
    /// Expiration time (seconds since epoch)
    pub exp: i64,
}

impl Claims {
    /// 有效期超出时间范围时返回 `Signing` 错误
    pub fn new(
        id: &AccountId,
        username: &str,
        role: Role,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        let exp = Utc::now()
            .checked_add_signed(lifetime)
            .ok_or_else(|| TokenError::Signing("token lifetime out of range".to_string()))?;

        Ok(Self {
            id: id.to_string(),
            username: username.to_string(),
            role,
            exp: exp.timestamp(),
        })
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// 转换为请求级身份
    pub fn identity(&self) -> Result<Identity, TokenError> {
        let account_id = AccountId::from_string(&self.id).map_err(|_| TokenError::Malformed)?;
        Ok(Identity {
            account_id,
            username: self.username.clone(),
            role: self.role,
        })
    }
}

/// 已认证的调用方身份
///
/// 由认证中间件写入请求扩展，供后续中间件和处理器读取
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: AccountId,
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn is_administrator(&self) -> bool {
        self.role.is_administrator()
    }
}
