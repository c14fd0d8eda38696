//! 注册凭据值对象

use std::fmt;

use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use tasker_errors::AppError;
use thiserror::Error;

/// Username 值对象
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub const MAX_LEN: usize = 64;

    pub fn new(username: impl Into<String>) -> Result<Self, UsernameError> {
        let username = username.into();
        Self::validate(&username)?;
        Ok(Self(username))
    }

    fn validate(username: &str) -> Result<(), UsernameError> {
        if username.is_empty() {
            return Err(UsernameError::Empty);
        }

        if username.chars().count() > Self::MAX_LEN {
            return Err(UsernameError::TooLong);
        }

        if username.trim() != username {
            return Err(UsernameError::SurroundingWhitespace);
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("username is required")]
    Empty,

    #[error("username must be at most 64 characters")]
    TooLong,

    #[error("username must not start or end with whitespace")]
    SurroundingWhitespace,
}

impl From<UsernameError> for AppError {
    fn from(err: UsernameError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// 明文密码（仅在注册与登录请求的生命周期内存在）
#[derive(Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub const MAX_LEN: usize = 128;

    pub fn new(password: impl Into<String>) -> Result<Self, PasswordPolicyError> {
        let password = password.into();

        if password.is_empty() {
            return Err(PasswordPolicyError::Empty);
        }

        if password.chars().count() > Self::MAX_LEN {
            return Err(PasswordPolicyError::TooLong);
        }

        Ok(Self(Secret::new(password)))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("password is required")]
    Empty,

    #[error("password must be at most 128 characters")]
    TooLong,
}

impl From<PasswordPolicyError> for AppError {
    fn from(err: PasswordPolicyError) -> Self {
        AppError::validation(err.to_string())
    }
}
