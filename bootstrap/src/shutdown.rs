//! Graceful Shutdown
//!
//! 根取消令牌：每个请求派生子令牌，关闭时统一取消

use tasker_common::CancellationToken;
use tracing::info;

/// Shutdown 控制器
#[derive(Debug, Clone, Default)]
pub struct ShutdownController {
    root: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根令牌，交给 HTTP 层派生请求令牌
    pub fn token(&self) -> CancellationToken {
        self.root.clone()
    }

    /// 触发关闭
    pub fn shutdown(&self) {
        info!("Triggering shutdown");
        self.root.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.root.is_cancelled()
    }

    /// 等待关闭
    pub async fn wait(&self) {
        self.root.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_cancels_request_tokens() {
        let controller = ShutdownController::new();
        let request = controller.token().child_token();

        assert!(!request.is_cancelled());
        controller.shutdown();

        controller.wait().await;
        assert!(controller.is_shutdown());
        assert!(request.is_cancelled());
    }
}
