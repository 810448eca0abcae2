//! 从 gRPC 请求构造 [`RequestContext`]

use std::time::Duration;

use ditto_common::{CallerId, RequestContext};
use tokio_util::sync::CancellationToken;
use tonic::Request;

const GRPC_TIMEOUT: &str = "grpc-timeout";

/// 为单次调用建立上下文
///
/// 调用方身份只取自拦截器写入的扩展；`grpc-timeout` 转为截止时间；
/// 取消信号挂在服务关闭信号之下。
pub fn request_context<T>(request: &Request<T>, shutdown: &CancellationToken) -> RequestContext {
    let mut ctx = RequestContext::background().with_cancellation(shutdown);

    if let Some(caller) = request.extensions().get::<CallerId>() {
        ctx = ctx.with_caller(caller.clone());
    }

    let timeout = request
        .metadata()
        .get(GRPC_TIMEOUT)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_grpc_timeout);
    if let Some(timeout) = timeout {
        ctx = ctx.with_timeout(timeout);
    }

    ctx
}

/// 解析 `grpc-timeout` 头，格式为最多 8 位数字加单位（H M S m u n）
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if value.len() < 2 {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    if digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    let duration = match unit {
        "H" => Duration::from_secs(amount * 3600),
        "M" => Duration::from_secs(amount * 60),
        "S" => Duration::from_secs(amount),
        "m" => Duration::from_millis(amount),
        "u" => Duration::from_micros(amount),
        "n" => Duration::from_nanos(amount),
        _ => return None,
    };
    Some(duration)
}
