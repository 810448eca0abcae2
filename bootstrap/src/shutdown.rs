//! Graceful Shutdown

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::info;

/// Shutdown 控制器
///
/// 关闭时取消根信号，所有由它派生的请求上下文随之取消。
#[derive(Clone, Default)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 触发关闭
    pub fn shutdown(&self) {
        info!("Triggering shutdown");
        self.token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 根取消信号
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// 等待关闭信号
    pub fn wait(&self) -> WaitForCancellationFutureOwned {
        self.token.clone().cancelled_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditto_common::RequestContext;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_releases_waiters() {
        let controller = ShutdownController::new();
        let waiter = tokio::spawn(controller.wait());

        controller.shutdown();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(controller.is_shutdown());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_request_contexts() {
        let controller = ShutdownController::new();
        let ctx = RequestContext::background().with_cancellation(controller.token());
        assert!(ctx.check().is_ok());

        controller.shutdown();
        assert!(ctx.check().is_err());
    }
}
