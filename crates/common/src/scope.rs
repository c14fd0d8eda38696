//! 用例超时作用域
//!
//! 每次用例调用都从请求的取消令牌派生一个带截止时间的子作用域，
//! 仓储只拿到这个作用域，因此存储调用不会超过配置的上限。
//! 作用域被丢弃时子令牌一定会被取消（无论成功、失败还是调用方取消）。

use std::future::Future;
use std::time::Duration;

use tasker_errors::AppError;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

/// 用例超时策略（服务启动时配置一次）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    timeout: Duration,
}

impl TimeoutPolicy {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);
    /// 超时上限，更大的值被截断
    pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: timeout.min(Self::MAX_TIMEOUT),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 从父令牌派生一个新的作用域
    pub fn scope(&self, parent: &CancellationToken) -> OperationScope {
        OperationScope::derive(parent, self.timeout)
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

/// 有界作用域
pub struct OperationScope {
    token: CancellationToken,
    deadline: Instant,
    _guard: DropGuard,
}

impl OperationScope {
    pub fn derive(parent: &CancellationToken, timeout: Duration) -> Self {
        let token = parent.child_token();
        let guard = token.clone().drop_guard();
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout)
            .or_else(|| now.checked_add(TimeoutPolicy::MAX_TIMEOUT))
            .unwrap_or(now);
        Self {
            token,
            deadline,
            _guard: guard,
        }
    }

    /// 作用域自身的取消令牌
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// 作用域已过期或已取消时返回错误
    pub fn ensure_active(&self) -> Result<(), AppError> {
        if Instant::now() >= self.deadline {
            return Err(AppError::timeout("operation timed out"));
        }
        if self.token.is_cancelled() {
            return Err(AppError::cancelled("operation cancelled"));
        }
        Ok(())
    }

    /// 在作用域内执行操作，截止时间或取消先到则放弃该操作
    pub async fn run<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<AppError>,
    {
        self.ensure_active()?;

        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!("Operation scope cancelled by parent");
                Err(AppError::cancelled("operation cancelled").into())
            }
            _ = tokio::time::sleep_until(self.deadline) => {
                self.token.cancel();
                debug!("Operation scope deadline exceeded");
                Err(AppError::timeout("operation timed out").into())
            }
            result = operation => result,
        }
    }
}

impl std::fmt::Debug for OperationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationScope")
            .field("deadline", &self.deadline)
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
