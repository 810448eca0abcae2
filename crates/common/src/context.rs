//! 请求上下文
//!
//! 每个调用对应一个 `RequestContext`：携带取消信号、可选的截止时间以及
//! 由拦截器注入的调用方身份。存储调用都通过 [`RequestContext::run`] 执行，
//! 上下文被取消或超时时立即中止并返回对应错误。

use std::future::Future;
use std::time::Duration;

use ditto_errors::{AppError, AppResult};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::types::{CallerId, USER_ID_KEY};

/// 单次调用的执行上下文
#[derive(Debug, Clone)]
pub struct RequestContext {
    caller: Option<CallerId>,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl RequestContext {
    /// 无调用方、无截止时间、永不取消的上下文
    pub fn background() -> Self {
        Self {
            caller: None,
            deadline: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_caller(mut self, caller: CallerId) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// 绑定到父级取消信号（例如服务关闭信号）
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    pub fn caller(&self) -> Option<&CallerId> {
        self.caller.as_ref()
    }

    /// 读取调用方身份；缺失或为空时视为"没有调用方"
    pub fn require_caller(&self) -> AppResult<&CallerId> {
        self.caller
            .as_ref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::missing_caller(format!("{} absent from context", USER_ID_KEY)))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 当前是否已取消或超时
    pub fn check(&self) -> AppResult<()> {
        if self.cancel.is_cancelled() {
            return Err(AppError::cancelled("request context cancelled"));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(AppError::deadline_exceeded("request deadline exceeded"));
            }
        }
        Ok(())
    }

    /// 在上下文约束下执行异步操作
    pub async fn run<F, T>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.check()?;

        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::cancelled("request context cancelled")),
            _ = expired => Err(AppError::deadline_exceeded("request deadline exceeded")),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_caller_absent() {
        let ctx = RequestContext::background();
        let err = ctx.require_caller().unwrap_err();
        assert!(matches!(err, AppError::MissingCaller(_)));
    }

    #[test]
    fn test_require_caller_empty_is_absent() {
        let ctx = RequestContext::background().with_caller(CallerId::new(""));
        assert!(ctx.require_caller().is_err());
    }

    #[test]
    fn test_require_caller_present() {
        let ctx = RequestContext::background().with_caller(CallerId::new("u1"));
        assert_eq!(ctx.require_caller().unwrap().as_str(), "u1");
    }

    #[tokio::test]
    async fn test_run_completes() {
        let ctx = RequestContext::background();
        let value = ctx.run(async { Ok::<_, AppError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_run_cancelled_before_start() {
        let ctx = RequestContext::background();
        ctx.cancel();
        let err = ctx.run(async { Ok::<_, AppError>(()) }).await.unwrap_err();
        assert!(matches!(err, AppError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_run_aborts_on_parent_cancel() {
        let shutdown = CancellationToken::new();
        let ctx = RequestContext::background().with_cancellation(&shutdown);

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = ctx
            .run(async {
                std::future::pending::<()>().await;
                Ok::<_, AppError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cancelled(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_deadline_exceeded() {
        let ctx = RequestContext::background().with_timeout(Duration::from_millis(50));
        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, AppError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DeadlineExceeded(_)));
    }
}
