//! 服务错误定义

use tasker_errors::AppError;
use thiserror::Error;

/// 登录失败的类型
///
/// 内部与日志中保持区分；HTTP 层按配置决定是否合并
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("user not found")]
    UserNotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error(transparent)]
    App(#[from] AppError),
}

impl AuthError {
    /// 是否为凭据错误（用户不存在或密码错误）
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, AuthError::UserNotFound | AuthError::WrongPassword)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserNotFound => AppError::not_found("user not found"),
            AuthError::WrongPassword => AppError::unauthorized("wrong password"),
            AuthError::App(e) => e,
        }
    }
}
